use std::{fmt::Display, ops::Deref};

use arcstr::ArcStr;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use unicase::UniCase;
use unicode_segmentation::UnicodeSegmentation;

/// NOTE: Case insensitive, efficient representation of an immutable string
#[derive(Debug, Default, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct AppString(UniCase<ArcStr>);

impl Display for AppString {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl AppString {
    #[inline]
    #[must_use]
    pub fn grapheme_len(&self) -> usize {
        self.0.graphemes(true).count()
    }

    #[inline]
    #[must_use]
    pub fn as_arcstr(&self) -> ArcStr {
        self.0.clone().into_inner()
    }
}

impl From<String> for AppString {
    fn from(value: String) -> Self {
        Self(UniCase::new(ArcStr::from(value)))
    }
}

impl From<&str> for AppString {
    fn from(value: &str) -> Self {
        Self(UniCase::new(ArcStr::from(value)))
    }
}

impl From<ArcStr> for AppString {
    fn from(value: ArcStr) -> Self {
        Self(UniCase::new(value))
    }
}

impl Deref for AppString {
    type Target = str;

    fn deref(&self) -> &Self::Target {
        self.0.as_str()
    }
}

impl Serialize for AppString {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self)
    }
}

impl<'de> Deserialize<'de> for AppString {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        String::deserialize(deserializer).map(Self::from)
    }
}
