//! Serde Support
//!
//! A variant is encoded as a two-element tuple `(index, value)` where
//! `index: u32` names the live alternative. Self-describing formats show it
//! as `[1, "text"]`; compact formats such as bincode write the index followed
//! by the value.
//!
//! A valueless variant has nothing to encode and fails to serialize.

use std::fmt;
use std::marker::PhantomData;

use serde::de::{self, Deserialize, Deserializer, SeqAccess, Unexpected};
use serde::ser::{self, Serialize, SerializeTuple, Serializer};

use crate::alternatives::Alternatives;
use crate::storage::{Chain, Layer, Terminal};
use crate::variant::Variant;
use crate::variant_storage::VariantStorage;

/// # Safety
/// Same layout contract as [`Chain`].
#[doc(hidden)]
pub unsafe trait SerializeChain: Chain {
    /// # Safety
    /// The chain must hold a live alternative `index`.
    unsafe fn serialize_at<S: SerializeTuple>(
        this: *const Self,
        index: usize,
        tuple: &mut S,
    ) -> Result<(), S::Error>;
}

/// # Safety
/// Same layout contract as [`Chain`].
#[doc(hidden)]
pub unsafe trait DeserializeChain<'de>: Chain {
    /// Read alternative `index` from `seq` into the empty chain. Returns
    /// `false` if the sequence ended first.
    ///
    /// # Safety
    /// No alternative may be live in `this`.
    unsafe fn deserialize_at<A: SeqAccess<'de>>(
        this: *mut Self,
        index: usize,
        seq: &mut A,
    ) -> Result<bool, A::Error>;
}

unsafe impl SerializeChain for Terminal {
    unsafe fn serialize_at<S: SerializeTuple>(
        _this: *const Self,
        index: usize,
        _tuple: &mut S,
    ) -> Result<(), S::Error> {
        unreachable!("serialize_at: alternative index {index} is past the last layer")
    }
}

unsafe impl<'de> DeserializeChain<'de> for Terminal {
    unsafe fn deserialize_at<A: SeqAccess<'de>>(
        _this: *mut Self,
        index: usize,
        _seq: &mut A,
    ) -> Result<bool, A::Error> {
        unreachable!("deserialize_at: alternative index {index} is past the last layer")
    }
}

unsafe impl<T: Serialize, Rest: SerializeChain> SerializeChain for Layer<T, Rest> {
    unsafe fn serialize_at<S: SerializeTuple>(
        this: *const Self,
        index: usize,
        tuple: &mut S,
    ) -> Result<(), S::Error> {
        unsafe {
            if index == 0 {
                tuple.serialize_element(&*Self::head(this))
            } else {
                Rest::serialize_at(Self::tail(this), index - 1, tuple)
            }
        }
    }
}

unsafe impl<'de, T: Deserialize<'de>, Rest: DeserializeChain<'de>> DeserializeChain<'de>
    for Layer<T, Rest>
{
    unsafe fn deserialize_at<A: SeqAccess<'de>>(
        this: *mut Self,
        index: usize,
        seq: &mut A,
    ) -> Result<bool, A::Error> {
        unsafe {
            if index != 0 {
                return Rest::deserialize_at(Self::tail_mut(this), index - 1, seq);
            }
            match seq.next_element::<T>()? {
                Some(value) => {
                    Self::head_mut(this).write(value);
                    Ok(true)
                }
                None => Ok(false),
            }
        }
    }
}

impl<L: Alternatives> Serialize for Variant<L>
where
    L::Union: SerializeChain,
{
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        if self.is_valueless() {
            return Err(ser::Error::custom("cannot serialize a valueless variant"));
        }
        let index = self.index();
        let tag = u32::try_from(index).map_err(ser::Error::custom)?;

        let mut tuple = serializer.serialize_tuple(2)?;
        tuple.serialize_element(&tag)?;
        unsafe {
            <L::Union as SerializeChain>::serialize_at(
                self.storage.as_ptr().cast(),
                index,
                &mut tuple,
            )?;
        }
        tuple.end()
    }
}

struct VariantVisitor<L>(PhantomData<L>);

impl<'de, L: Alternatives> de::Visitor<'de> for VariantVisitor<L>
where
    L::Union: DeserializeChain<'de>,
{
    type Value = Variant<L>;

    fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "a tuple of an alternative index below {} and its value",
            L::LEN
        )
    }

    fn visit_seq<A: SeqAccess<'de>>(self, mut seq: A) -> Result<Variant<L>, A::Error> {
        let tag: u32 = seq
            .next_element()?
            .ok_or_else(|| de::Error::invalid_length(0, &self))?;
        let index = tag as usize;
        if index >= L::LEN {
            return Err(de::Error::invalid_value(
                Unexpected::Unsigned(u64::from(tag)),
                &self,
            ));
        }

        let mut storage = VariantStorage::<L>::valueless();
        let slots = storage.union_mut();
        let filled =
            unsafe { <L::Union as DeserializeChain<'de>>::deserialize_at(slots, index, &mut seq)? };
        if !filled {
            return Err(de::Error::invalid_length(1, &self));
        }
        unsafe { storage.assume_constructed(index) };
        Ok(Variant { storage })
    }
}

impl<'de, L: Alternatives> Deserialize<'de> for Variant<L>
where
    L::Union: DeserializeChain<'de>,
{
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        deserializer.deserialize_tuple(2, VariantVisitor(PhantomData))
    }
}
