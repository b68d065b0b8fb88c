//! `HNSWIndexAuxInfo` (§4.7 step 4): the index-type-specific auxiliary
//! bytes an `IndexCatalogEntry` carries opaquely (`IndexCatalogEntry::aux`,
//! §3/§6).

use crate::config::HnswConfig;
use gq_common::TableId;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HnswIndexAuxInfo {
    pub upper_rel_table_id: TableId,
    pub lower_rel_table_id: TableId,
    pub upper_entry_point: Option<u32>,
    pub lower_entry_point: Option<u32>,
    pub config: HnswConfig,
}

fn encode_option_u32(out: &mut Vec<u8>, value: Option<u32>) {
    match value {
        Some(v) => {
            out.push(1);
            out.extend_from_slice(&v.to_le_bytes());
        }
        None => out.push(0),
    }
}

fn decode_option_u32(bytes: &[u8], cursor: &mut usize) -> Option<Option<u32>> {
    let tag = *bytes.get(*cursor)?;
    *cursor += 1;
    if tag == 0 {
        return Some(None);
    }
    let v = u32::from_le_bytes(bytes.get(*cursor..*cursor + 4)?.try_into().ok()?);
    *cursor += 4;
    Some(Some(v))
}

impl HnswIndexAuxInfo {
    pub fn serialize(&self) -> Vec<u8> {
        let mut out = Vec::new();
        out.extend_from_slice(&self.upper_rel_table_id.0.to_le_bytes());
        out.extend_from_slice(&self.lower_rel_table_id.0.to_le_bytes());
        encode_option_u32(&mut out, self.upper_entry_point);
        encode_option_u32(&mut out, self.lower_entry_point);
        self.config.encode(&mut out);
        out
    }

    pub fn deserialize(bytes: &[u8]) -> Option<Self> {
        let mut cursor = 0usize;
        let upper_rel_table_id = TableId(u64::from_le_bytes(bytes.get(cursor..cursor + 8)?.try_into().ok()?));
        cursor += 8;
        let lower_rel_table_id = TableId(u64::from_le_bytes(bytes.get(cursor..cursor + 8)?.try_into().ok()?));
        cursor += 8;
        let upper_entry_point = decode_option_u32(bytes, &mut cursor)?;
        let lower_entry_point = decode_option_u32(bytes, &mut cursor)?;
        let config = HnswConfig::decode(bytes, &mut cursor)?;
        Some(HnswIndexAuxInfo {
            upper_rel_table_id,
            lower_rel_table_id,
            upper_entry_point,
            lower_entry_point,
            config,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::DistFunc;

    #[test]
    fn round_trips_through_serialize_deserialize() {
        let aux = HnswIndexAuxInfo {
            upper_rel_table_id: TableId(3),
            lower_rel_table_id: TableId(4),
            upper_entry_point: Some(7),
            lower_entry_point: None,
            config: HnswConfig {
                mu: 10,
                ml: 0.4,
                efc: 50,
                dist_func: DistFunc::Dot,
                alpha: 1.0,
                pu: 0.1,
            },
        };
        let bytes = aux.serialize();
        assert_eq!(HnswIndexAuxInfo::deserialize(&bytes), Some(aux));
    }
}
