//! Serialization support for grids, sample maps and weight tables.
//!
//! Maps are expensive to compute for spherical geometries, so callers cache
//! them on disk; these impls keep the payload format plain (shape fields
//! plus flat data) and deserialize into the default allocator.

use ::serde::ser::SerializeStruct;
use ::serde::Deserialize;

use crate::allocator::GridAllocator;
use crate::grid::{Grid, GridSize};
use crate::sample_map::{InterpWeights, SampleMap};
use crate::storage::GridStorage;

impl<T, A> ::serde::Serialize for Grid<T, A>
where
    T: ::serde::Serialize,
    A: GridAllocator,
{
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: ::serde::Serializer,
    {
        let mut state = serializer.serialize_struct("Grid", 3)?;
        state.serialize_field("data", self.storage.as_slice())?;
        state.serialize_field("shape", &self.shape.to_vec())?;
        state.serialize_field("strides", &self.strides.to_vec())?;
        state.end()
    }
}

impl<'de, T, A> ::serde::Deserialize<'de> for Grid<T, A>
where
    T: ::serde::Deserialize<'de>,
    A: GridAllocator + Default,
{
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: ::serde::Deserializer<'de>,
    {
        #[derive(Deserialize)]
        struct GridData<T> {
            data: Vec<T>,
            shape: Vec<usize>,
            strides: Vec<usize>,
        }

        let GridData {
            data,
            shape,
            strides,
        } = GridData::deserialize(deserializer)?;

        let shape: [usize; 3] = shape
            .try_into()
            .map_err(|_| ::serde::de::Error::custom("Invalid shape"))?;
        let strides: [usize; 3] = strides
            .try_into()
            .map_err(|_| ::serde::de::Error::custom("Invalid strides"))?;
        if data.len() != shape[0] * shape[1] * shape[2] {
            return Err(::serde::de::Error::custom(
                "Data length does not match shape",
            ));
        }

        let storage = GridStorage::from_vec(data, A::default())
            .map_err(::serde::de::Error::custom)?;

        Ok(Grid {
            storage,
            shape,
            strides,
        })
    }
}

impl<A: GridAllocator> ::serde::Serialize for SampleMap<A> {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: ::serde::Serializer,
    {
        let mut state = serializer.serialize_struct("SampleMap", 5)?;
        state.serialize_field("out_size", &self.out_size())?;
        state.serialize_field("src_size", &self.src_size())?;
        state.serialize_field("kernel_size", &self.kernel_size())?;
        state.serialize_field("interp_pts", &self.interp_pts())?;
        state.serialize_field("data", self.as_slice())?;
        state.end()
    }
}

impl<'de, A> ::serde::Deserialize<'de> for SampleMap<A>
where
    A: GridAllocator + Default,
{
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: ::serde::Deserializer<'de>,
    {
        #[derive(Deserialize)]
        struct SampleMapData {
            out_size: GridSize,
            src_size: GridSize,
            kernel_size: usize,
            interp_pts: usize,
            data: Vec<f32>,
        }

        let raw = SampleMapData::deserialize(deserializer)?;
        SampleMap::new(
            raw.out_size,
            raw.src_size,
            raw.kernel_size,
            raw.interp_pts,
            raw.data,
            A::default(),
        )
        .map_err(::serde::de::Error::custom)
    }
}

impl<A: GridAllocator> ::serde::Serialize for InterpWeights<A> {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: ::serde::Serializer,
    {
        let mut state = serializer.serialize_struct("InterpWeights", 4)?;
        state.serialize_field("out_size", &self.out_size())?;
        state.serialize_field("kernel_size", &self.kernel_size())?;
        state.serialize_field("interp_pts", &self.interp_pts())?;
        state.serialize_field("data", self.as_slice())?;
        state.end()
    }
}

impl<'de, A> ::serde::Deserialize<'de> for InterpWeights<A>
where
    A: GridAllocator + Default,
{
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: ::serde::Deserializer<'de>,
    {
        #[derive(Deserialize)]
        struct InterpWeightsData {
            out_size: GridSize,
            kernel_size: usize,
            interp_pts: usize,
            data: Vec<f32>,
        }

        let raw = InterpWeightsData::deserialize(deserializer)?;
        InterpWeights::new(
            raw.out_size,
            raw.kernel_size,
            raw.interp_pts,
            raw.data,
            A::default(),
        )
        .map_err(::serde::de::Error::custom)
    }
}
