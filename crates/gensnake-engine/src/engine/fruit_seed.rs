use rand::{
    Rng, SeedableRng as _,
    distr::{Distribution, StandardUniform},
};
use rand_pcg::Pcg32;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// Seed for deterministic fruit placement.
///
/// A 128-bit seed for the generator that picks fruit cells. Two games with
/// the same seed, configuration and move sequence place every fruit in the
/// same cell. Serialized as a 32-character hex string.
///
/// ```
/// use gensnake_engine::FruitSeed;
/// use rand::Rng as _;
///
/// let seed: FruitSeed = rand::rng().random();
/// let json = serde_json::to_string(&seed).unwrap();
/// assert_eq!(json.len(), 34);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct FruitSeed([u8; 16]);

impl FruitSeed {
    #[must_use]
    pub const fn from_bytes(bytes: [u8; 16]) -> Self {
        Self(bytes)
    }

    /// Widens a small integer seed, convenient on the command line.
    #[must_use]
    pub const fn from_u64(value: u64) -> Self {
        Self((value as u128).to_be_bytes())
    }

    #[must_use]
    pub const fn as_bytes(&self) -> &[u8; 16] {
        &self.0
    }

    pub(crate) fn rng(self) -> Pcg32 {
        Pcg32::from_seed(self.0)
    }
}

impl Serialize for FruitSeed {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let num = u128::from_be_bytes(self.0);
        serializer.serialize_str(&format!("{num:032x}"))
    }
}

impl<'de> Deserialize<'de> for FruitSeed {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let hex_str = String::deserialize(deserializer)?;
        if hex_str.len() != 32 {
            return Err(serde::de::Error::custom(format!(
                "invalid hex: expected 32 characters, got {}",
                hex_str.len()
            )));
        }
        let num = u128::from_str_radix(&hex_str, 16)
            .map_err(|e| serde::de::Error::custom(format!("invalid hex: {hex_str} ({e})")))?;
        Ok(Self(num.to_be_bytes()))
    }
}

impl Distribution<FruitSeed> for StandardUniform {
    fn sample<R: Rng + ?Sized>(&self, rng: &mut R) -> FruitSeed {
        let mut seed = [0; 16];
        rng.fill(&mut seed);
        FruitSeed(seed)
    }
}
