use std::{fmt, str::FromStr};

use thiserror::Error;

/// One step down a term tree.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Debug)]
pub enum Branch {
    /// Into an abstraction body (`d`).
    Body,
    /// Into an application's function position (`l`).
    Func,
    /// Into an application's argument position (`r`).
    Arg,
}

impl Branch {
    pub fn as_char(self) -> char {
        match self {
            Branch::Body => 'd',
            Branch::Func => 'l',
            Branch::Arg => 'r',
        }
    }
}

/// Address of a subterm: the branch letters on the way down from the root,
/// the root itself being the empty address. Addresses are purely positional;
/// one stays meaningful exactly as long as the tree shape above it does.
#[derive(Default, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Debug)]
pub struct Path(String);

impl Path {
    pub fn root() -> Self {
        Path::default()
    }

    pub fn is_root(&self) -> bool {
        self.0.is_empty()
    }

    pub fn child(&self, branch: Branch) -> Path {
        let mut address = String::with_capacity(self.0.len() + 1);
        address.push_str(&self.0);
        address.push(branch.as_char());
        Path(address)
    }

    pub fn branches(&self) -> impl Iterator<Item = Branch> + '_ {
        self.0.chars().map(|c| match c {
            'd' => Branch::Body,
            'l' => Branch::Func,
            'r' => Branch::Arg,
            _ => unreachable!("address characters are validated on construction"),
        })
    }

    /// Proper prefixes, shortest first; includes the root, excludes `self`.
    pub fn prefixes(&self) -> impl Iterator<Item = Path> + '_ {
        (0..self.0.len()).map(|i| Path(self.0[..i].to_string()))
    }

    pub fn starts_with(&self, prefix: &Path) -> bool {
        self.0.starts_with(&prefix.0)
    }
}

impl fmt::Display for Path {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Debug, Error)]
#[error("invalid address character `{0}`, expected `d`, `l`, or `r`")]
pub struct AddressParseError(char);

impl FromStr for Path {
    type Err = AddressParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if let Some(c) = s.chars().find(|c| !matches!(c, 'd' | 'l' | 'r')) {
            return Err(AddressParseError(c));
        }
        Ok(Path(s.to_string()))
    }
}
