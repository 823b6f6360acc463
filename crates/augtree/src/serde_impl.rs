//! Trees serialize as the in-order sequence of their values.
//!
//! Colors and tree shapes are not preserved: a deserialized tree is
//! rebuilt and repainted from scratch.

use crate::augmented::AugTree;
use crate::rb::{ColorAccess, Colored};
use crate::synth::Synthesizer;
use serde::de::{Deserialize, Deserializer};
use serde::ser::{Serialize, SerializeSeq, Serializer};

impl<T: Serialize> Serialize for Colored<T> {
    fn serialize<Ser: Serializer>(&self, serializer: Ser) -> Result<Ser::Ok, Ser::Error> {
        self.value.serialize(serializer)
    }
}

impl<'de, T: Deserialize<'de>> Deserialize<'de> for Colored<T> {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        T::deserialize(deserializer).map(Colored::new)
    }
}

impl<T: Serialize, S, Y, C> Serialize for AugTree<T, S, Y, C> {
    fn serialize<Ser: Serializer>(&self, serializer: Ser) -> Result<Ser::Ok, Ser::Error> {
        let mut seq = serializer.serialize_seq(Some(self.iter().count()))?;
        for value in self.iter() {
            seq.serialize_element(value)?;
        }
        seq.end()
    }
}

impl<'de, T, S, Y, C> Deserialize<'de> for AugTree<T, S, Y, C>
where
    T: Deserialize<'de>,
    Y: Synthesizer<T, S> + Default,
    C: ColorAccess<T>,
{
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let values = Vec::<T>::deserialize(deserializer)?;
        Ok(Self::from_vec(values, Y::default()))
    }
}
