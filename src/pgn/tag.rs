// This file is part of the pgnkit library.
// Copyright (C) 2026 pgnkit contributors
//
// This program is free software: you can redistribute it and/or modify
// it under the terms of the GNU General Public License as published by
// the Free Software Foundation, either version 3 of the License, or
// (at your option) any later version.
//
// This program is distributed in the hope that it will be useful,
// but WITHOUT ANY WARRANTY; without even the implied warranty of
// MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE. See the
// GNU General Public License for more details.
//
// You should have received a copy of the GNU General Public License
// along with this program. If not, see <http://www.gnu.org/licenses/>.

use std::{
    borrow::Cow,
    fmt,
    str::{self, Utf8Error},
};

/// A tag pair like `[White "Morphy, Paul"]`.
///
/// The value is kept with [backslash
/// escapes](http://www.saremba.de/chessgml/standards/pgn/pgn-complete.htm#c7)
/// decoded:
///
/// > A quote inside a string is represented by the backslash immediately
/// > followed by a quote. A backslash inside a string is represented by
/// > two adjacent backslashes.
///
/// Both parts stay bytes until they are decoded on request.
#[derive(Clone, Eq, PartialEq, Hash)]
pub struct TagPair<'a> {
    name: Cow<'a, [u8]>,
    value: Cow<'a, [u8]>,
}

impl<'a> TagPair<'a> {
    /// Creates a tag pair from already decoded parts.
    pub fn new<N, V>(name: N, value: V) -> TagPair<'a>
    where
        N: Into<Cow<'a, str>>,
        V: Into<Cow<'a, str>>,
    {
        TagPair {
            name: cow_bytes(name.into()),
            value: cow_bytes(value.into()),
        }
    }

    /// Creates a tag pair from a name and a value as written between the
    /// quotes. Allocates only when the value actually contains escape
    /// sequences.
    ///
    /// # Examples
    ///
    /// ```
    /// use pgnkit::pgn::TagPair;
    ///
    /// let tag = TagPair::from_raw(b"Event", br#"The \"Opera\" Game"#);
    /// assert_eq!(tag.value_utf8()?, r#"The "Opera" Game"#);
    /// # Ok::<_, std::str::Utf8Error>(())
    /// ```
    pub fn from_raw(name: &'a [u8], raw_value: &'a [u8]) -> TagPair<'a> {
        TagPair {
            name: Cow::Borrowed(name),
            value: unescape(raw_value),
        }
    }

    pub fn name(&self) -> &[u8] {
        &self.name
    }

    pub fn value(&self) -> &[u8] {
        &self.value
    }

    /// Tests if the tag has the given name.
    pub fn is(&self, name: &str) -> bool {
        self.name() == name.as_bytes()
    }

    /// Tries to decode the name as UTF-8.
    ///
    /// # Errors
    ///
    /// Errors if the name contains an invalid UTF-8 byte sequence.
    pub fn name_utf8(&self) -> Result<&str, Utf8Error> {
        str::from_utf8(&self.name)
    }

    /// Tries to decode the value as UTF-8. This is guaranteed to succeed on
    /// valid PGNs.
    ///
    /// # Errors
    ///
    /// Errors if the value contains an invalid UTF-8 byte sequence.
    pub fn value_utf8(&self) -> Result<&str, Utf8Error> {
        str::from_utf8(&self.value)
    }

    /// Decodes the value as UTF-8, replacing any invalid byte sequences with
    /// the placeholder � U+FFFD.
    pub fn value_utf8_lossy(&self) -> Cow<'_, str> {
        String::from_utf8_lossy(&self.value)
    }

    pub fn into_owned(self) -> TagPair<'static> {
        TagPair {
            name: Cow::Owned(self.name.into_owned()),
            value: Cow::Owned(self.value.into_owned()),
        }
    }
}

fn cow_bytes(s: Cow<'_, str>) -> Cow<'_, [u8]> {
    match s {
        Cow::Borrowed(s) => Cow::Borrowed(s.as_bytes()),
        Cow::Owned(s) => Cow::Owned(s.into_bytes()),
    }
}

fn unescape(raw: &[u8]) -> Cow<'_, [u8]> {
    let mut head = 0;
    let mut decoded: Vec<u8> = Vec::new();
    let mut escapes = memchr::memchr_iter(b'\\', raw);
    while let Some(escape) = escapes.next() {
        if let Some(b'\\' | b'"') = raw.get(escape + 1) {
            decoded.extend_from_slice(&raw[head..escape]);
            head = escape + 1;
            if raw[escape + 1] == b'\\' {
                // The escaped backslash does not start another escape.
                escapes.next();
            }
        }
    }
    if head == 0 {
        Cow::Borrowed(raw)
    } else {
        decoded.extend_from_slice(&raw[head..]);
        Cow::Owned(decoded)
    }
}

impl fmt::Debug for TagPair<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("TagPair")
            .field(&String::from_utf8_lossy(&self.name))
            .field(&self.value_utf8_lossy())
            .finish()
    }
}

impl fmt::Display for TagPair<'_> {
    /// Writes the tag pair in export format, escaping the value again.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{} \"", String::from_utf8_lossy(&self.name))?;
        for ch in self.value_utf8_lossy().chars() {
            if ch == '"' || ch == '\\' {
                f.write_str("\\")?;
            }
            write!(f, "{ch}")?;
        }
        f.write_str("\"]")
    }
}
