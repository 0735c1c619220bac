//! Run identity minting.
//!
//! Every solver run is namespaced by a [`RunId`]: 128 bits drawn from the
//! thread-local CSPRNG (`rand::thread_rng`, reseeded from the operating system)
//! and rendered in the familiar hyphenated `8-4-4-4-12` hex layout. Identities
//! are never derived from counters, so concurrent minting on different threads
//! or in different processes cannot collide at sweep scale.

use std::fmt::{self, Display};

use rand::{CryptoRng, Rng, RngCore};
use serde::{Deserialize, Serialize};

/// Opaque, collision-resistant token naming a single solver run.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RunId(String);

impl RunId {
    /// Length of the rendered identity in characters.
    pub const LEN: usize = 36;

    /// Mints a fresh identity from the thread-local CSPRNG.
    pub fn mint() -> Self {
        Self::mint_from(&mut rand::thread_rng())
    }

    /// Mints an identity from a caller supplied cryptographic RNG.
    pub fn mint_from<R: RngCore + CryptoRng>(rng: &mut R) -> Self {
        Self::from_bits(rng.gen::<u128>())
    }

    fn from_bits(raw: u128) -> Self {
        let hex = format!("{raw:032x}");
        Self(format!(
            "{}-{}-{}-{}-{}",
            &hex[0..8],
            &hex[8..12],
            &hex[12..16],
            &hex[16..20],
            &hex[20..32]
        ))
    }

    /// Returns the rendered identity.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Display for RunId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for RunId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn renders_fixed_layout() {
        let id = RunId::from_bits(0x0123_4567_89ab_cdef_0011_2233_4455_6677);
        assert_eq!(id.as_str(), "01234567-89ab-cdef-0011-223344556677");
        assert_eq!(id.as_str().len(), RunId::LEN);
    }

    #[test]
    fn zero_bits_keep_width() {
        assert_eq!(RunId::from_bits(0).as_str().len(), RunId::LEN);
    }
}
