use num::Num;
use serde::de::Error as DeError;
use serde::ser::SerializeStruct;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use super::ZeroSpVec;

impl<N> Serialize for ZeroSpVec<N>
where
    N: Num + Serialize + Copy,
{
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        // fields: len, nnz, entries
        let mut state = serializer.serialize_struct("ZeroSpVec", 3)?;
        state.serialize_field("len", &(self.len as u64))?;
        state.serialize_field("nnz", &(self.nnz() as u64))?;

        // entries are written as ordered (index, value) pairs
        let entries: Vec<(u64, N)> = self
            .raw_iter()
            .map(|(idx, val)| (idx as u64, *val))
            .collect();
        state.serialize_field("entries", &entries)?;
        state.end()
    }
}

impl<'de, N> Deserialize<'de> for ZeroSpVec<N>
where
    N: Num + Deserialize<'de> + Copy,
{
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        #[derive(Deserialize)]
        struct ZeroSpVecData<N> {
            len: u64,
            nnz: u64,
            entries: Vec<(u64, N)>,
        }

        let data = ZeroSpVecData::<N>::deserialize(deserializer)?;
        if data.nnz != data.entries.len() as u64 {
            return Err(DeError::custom("ZeroSpVec deserialize error: nnz and entries length mismatch"));
        }
        ZeroSpVec::from_entries(
            data.len as usize,
            data.entries.into_iter().map(|(idx, val)| (idx as usize, val)),
        )
        .ok_or_else(|| DeError::custom("ZeroSpVec deserialize error: indices must be ascending and below len"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn serde_json_keeps_len_and_entries() {
        let mut v = ZeroSpVec::<f64>::new(100);
        v.add_at(3, 0.25);
        v.add_at(42, -1.5);

        let s = serde_json::to_string(&v).unwrap();
        assert_eq!(s, r#"{"len":100,"nnz":2,"entries":[[3,0.25],[42,-1.5]]}"#);

        let de: ZeroSpVec<f64> = serde_json::from_str(&s).unwrap();
        assert_eq!(de, v);
    }

    #[test]
    fn serde_rejects_index_beyond_len() {
        let bad = r#"{"len":4,"nnz":1,"entries":[[4,1.0]]}"#;
        assert!(serde_json::from_str::<ZeroSpVec<f64>>(bad).is_err());
    }

    #[test]
    fn serde_rejects_nnz_mismatch() {
        let bad = r#"{"len":4,"nnz":2,"entries":[[1,1.0]]}"#;
        assert!(serde_json::from_str::<ZeroSpVec<f64>>(bad).is_err());
    }

    #[test]
    fn serde_cbor_roundtrip() {
        let mut v = ZeroSpVec::<f64>::new(16);
        v.add_at(15, 2.0);
        let bytes = serde_cbor::to_vec(&v).unwrap();
        let de: ZeroSpVec<f64> = serde_cbor::from_slice(&bytes).unwrap();
        assert_eq!(de, v);
    }
}
