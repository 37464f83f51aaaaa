// SPDX-FileCopyrightText: 2025-2026 Zexin Yuan <aim@yzx9.xyz>
//
// SPDX-License-Identifier: Apache-2.0

use std::fmt;
use std::ops::Deref;

use jiff::Timestamp;
use jiff::fmt::rfc2822::DateTimeParser;

static HTTP_DATE: DateTimeParser = DateTimeParser::new();

/// Defines a string newtype that derefs to `str` and converts from strings.
macro_rules! string_newtype {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
        pub struct $name(String);

        impl $name {
            /// Returns the value as a string slice.
            #[must_use]
            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl Deref for $name {
            type Target = str;

            fn deref(&self) -> &str {
                &self.0
            }
        }

        impl AsRef<str> for $name {
            fn as_ref(&self) -> &str {
                &self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&self.0)
            }
        }

        impl From<String> for $name {
            fn from(value: String) -> Self {
                Self(value)
            }
        }

        impl From<&str> for $name {
            fn from(value: &str) -> Self {
                Self(value.to_owned())
            }
        }
    };
}

string_newtype! {
    /// Resource path as reported by the server, possibly escaped, such as
    /// `/files/report%202024.pdf`. Empty when the server sent none.
    Href
}

string_newtype! {
    /// Entity tag, kept exactly as the server sent it (quotes included).
    ETag
}

/// Metadata of a remote file or collection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileInfo {
    /// Full path on the server. Collections end with `/`.
    pub path: String,
    /// Name of the resource.
    pub name: String,
    /// Content type, empty if unknown.
    pub content_type: String,
    /// Size in bytes, `0` for collections.
    pub size: u64,
    /// Last modification time, the epoch if unknown.
    pub modified: Timestamp,
    /// Entity tag, empty if unknown.
    pub etag: ETag,
    /// Whether the resource is a collection.
    pub is_dir: bool,
}

impl FileInfo {
    /// Unix permission bits a local mirror of this resource would get.
    #[must_use]
    pub const fn mode(&self) -> u32 {
        if self.is_dir { 0o775 } else { 0o664 }
    }
}

impl fmt::Display for FileInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_dir {
            write!(f, "Dir : '{}' - '{}'", self.path, self.name)
        } else {
            write!(
                f,
                "File: '{}' SIZE: {} MODIFIED: {} ETAG: {} CTYPE: {}",
                self.path, self.size, self.modified, self.etag, self.content_type
            )
        }
    }
}

/// Parses an HTTP date (RFC 1123 / RFC 2822), falling back to the epoch.
#[must_use]
pub fn parse_http_date(value: &str) -> Timestamp {
    HTTP_DATE
        .parse_timestamp(value.trim())
        .unwrap_or(Timestamp::UNIX_EPOCH)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_rfc1123_dates() {
        let ts = parse_http_date("Tue, 15 Nov 1994 08:12:31 GMT");
        assert_eq!(ts.as_second(), 784_887_151);
    }

    #[test]
    fn unparsable_dates_fall_back_to_epoch() {
        assert_eq!(parse_http_date("yesterday"), Timestamp::UNIX_EPOCH);
        assert_eq!(parse_http_date(""), Timestamp::UNIX_EPOCH);
    }

    #[test]
    fn display_distinguishes_dirs_and_files() {
        let dir = FileInfo {
            path: "/docs/".to_string(),
            name: "docs".to_string(),
            content_type: String::new(),
            size: 0,
            modified: Timestamp::UNIX_EPOCH,
            etag: ETag::default(),
            is_dir: true,
        };
        assert_eq!(dir.to_string(), "Dir : '/docs/' - 'docs'");
        assert_eq!(dir.mode(), 0o775);

        let file = FileInfo {
            path: "/docs/a.txt".to_string(),
            name: "a.txt".to_string(),
            content_type: "text/plain".to_string(),
            size: 12,
            modified: Timestamp::UNIX_EPOCH,
            etag: ETag::from("\"x1\""),
            is_dir: false,
        };
        assert_eq!(
            file.to_string(),
            "File: '/docs/a.txt' SIZE: 12 MODIFIED: 1970-01-01T00:00:00Z ETAG: \"x1\" CTYPE: text/plain"
        );
        assert_eq!(file.mode(), 0o664);
    }
}
