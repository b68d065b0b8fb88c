//! Byte-exact catalog wire format (§6 STORAGE FORMAT): a `"KUZU"` magic, a
//! `u64` storage version, then the tagged entry set.
//!
//! The format is a flat, hand-rolled binary encoding rather than
//! `bincode`/`serde` derive output: entry tags must stay stable across
//! versions independent of field order, matching how the teacher encodes
//! its own commit log records (`crates/core/src/db/commit_log.rs`).

use crate::catalog::Catalog;
use crate::entry::{
    CatalogEntryType, IndexCatalogEntry, IndexKind, MacroCatalogEntry, NodeTableCatalogEntry, PropertyDefinition,
    RelGroupCatalogEntry, RelTableCatalogEntry,
};
use crate::error::{CatalogError, Result};
use gq_common::{ColumnId, IndexId, LogicalType, Multiplicity, PropertyId, StructField, TableId, Value};
use std::collections::{BTreeSet, HashMap};
use std::io::{Cursor, Read, Write};

const MAGIC: &[u8; 4] = b"KUZU";
pub const STORAGE_VERSION: u64 = 1;

trait WriteExt: Write {
    fn write_u8(&mut self, v: u8) -> Result<()> {
        self.write_all(&[v]).map_err(io_err)
    }
    fn write_u64(&mut self, v: u64) -> Result<()> {
        self.write_all(&v.to_le_bytes()).map_err(io_err)
    }
    fn write_i64(&mut self, v: i64) -> Result<()> {
        self.write_all(&v.to_le_bytes()).map_err(io_err)
    }
    fn write_f64(&mut self, v: f64) -> Result<()> {
        self.write_all(&v.to_le_bytes()).map_err(io_err)
    }
    fn write_bool(&mut self, v: bool) -> Result<()> {
        self.write_u8(v as u8)
    }
    fn write_bytes(&mut self, v: &[u8]) -> Result<()> {
        self.write_u64(v.len() as u64)?;
        self.write_all(v).map_err(io_err)
    }
    fn write_str(&mut self, v: &str) -> Result<()> {
        self.write_bytes(v.as_bytes())
    }
}
impl<W: Write + ?Sized> WriteExt for W {}

trait ReadExt: Read {
    fn read_u8(&mut self) -> Result<u8> {
        let mut b = [0u8; 1];
        self.read_exact(&mut b).map_err(io_err)?;
        Ok(b[0])
    }
    fn read_u64(&mut self) -> Result<u64> {
        let mut b = [0u8; 8];
        self.read_exact(&mut b).map_err(io_err)?;
        Ok(u64::from_le_bytes(b))
    }
    fn read_i64(&mut self) -> Result<i64> {
        let mut b = [0u8; 8];
        self.read_exact(&mut b).map_err(io_err)?;
        Ok(i64::from_le_bytes(b))
    }
    fn read_f64(&mut self) -> Result<f64> {
        let mut b = [0u8; 8];
        self.read_exact(&mut b).map_err(io_err)?;
        Ok(f64::from_le_bytes(b))
    }
    fn read_bool(&mut self) -> Result<bool> {
        Ok(self.read_u8()? != 0)
    }
    fn read_bytes(&mut self) -> Result<Vec<u8>> {
        let len = self.read_u64()? as usize;
        let mut buf = vec![0u8; len];
        self.read_exact(&mut buf).map_err(io_err)?;
        Ok(buf)
    }
    fn read_str(&mut self) -> Result<String> {
        String::from_utf8(self.read_bytes()?).map_err(|e| CatalogError::Io(e.to_string()))
    }
}
impl<R: Read + ?Sized> ReadExt for R {}

fn io_err(e: std::io::Error) -> CatalogError {
    CatalogError::Io(e.to_string())
}

fn write_logical_type<W: Write + ?Sized>(w: &mut W, ty: &LogicalType) -> Result<()> {
    match ty {
        LogicalType::Bool => w.write_u8(0),
        LogicalType::Int64 => w.write_u8(1),
        LogicalType::Int32 => w.write_u8(2),
        LogicalType::Int16 => w.write_u8(3),
        LogicalType::Double => w.write_u8(4),
        LogicalType::Float => w.write_u8(5),
        LogicalType::Date => w.write_u8(6),
        LogicalType::Timestamp => w.write_u8(7),
        LogicalType::Interval => w.write_u8(8),
        LogicalType::String => w.write_u8(9),
        LogicalType::InternalId => w.write_u8(10),
        LogicalType::Node => w.write_u8(11),
        LogicalType::Rel => w.write_u8(12),
        LogicalType::RecursiveRel => w.write_u8(13),
        LogicalType::Serial => w.write_u8(14),
        LogicalType::Any => w.write_u8(15),
        LogicalType::Struct(fields) => {
            w.write_u8(16)?;
            w.write_u64(fields.len() as u64)?;
            for f in fields {
                w.write_str(&f.name)?;
                write_logical_type(w, &f.ty)?;
            }
            Ok(())
        }
        LogicalType::FixedList { child, num_elements } => {
            w.write_u8(17)?;
            w.write_u64(*num_elements as u64)?;
            write_logical_type(w, child)
        }
        LogicalType::VarList { child } => {
            w.write_u8(18)?;
            write_logical_type(w, child)
        }
    }
}

fn read_logical_type<R: Read + ?Sized>(r: &mut R) -> Result<LogicalType> {
    Ok(match r.read_u8()? {
        0 => LogicalType::Bool,
        1 => LogicalType::Int64,
        2 => LogicalType::Int32,
        3 => LogicalType::Int16,
        4 => LogicalType::Double,
        5 => LogicalType::Float,
        6 => LogicalType::Date,
        7 => LogicalType::Timestamp,
        8 => LogicalType::Interval,
        9 => LogicalType::String,
        10 => LogicalType::InternalId,
        11 => LogicalType::Node,
        12 => LogicalType::Rel,
        13 => LogicalType::RecursiveRel,
        14 => LogicalType::Serial,
        15 => LogicalType::Any,
        16 => {
            let n = r.read_u64()? as usize;
            let mut fields = Vec::with_capacity(n);
            for _ in 0..n {
                let name = r.read_str()?;
                let ty = read_logical_type(r)?;
                fields.push(StructField { name, ty });
            }
            LogicalType::Struct(fields)
        }
        17 => {
            let num_elements = r.read_u64()? as usize;
            let child = Box::new(read_logical_type(r)?);
            LogicalType::FixedList { child, num_elements }
        }
        18 => LogicalType::VarList {
            child: Box::new(read_logical_type(r)?),
        },
        tag => return Err(CatalogError::Io(format!("unknown LogicalType tag {tag}"))),
    })
}

fn write_value<W: Write + ?Sized>(w: &mut W, v: &Value) -> Result<()> {
    match v {
        Value::Null(ty) => {
            w.write_u8(0)?;
            write_logical_type(w, ty)
        }
        Value::Bool(b) => {
            w.write_u8(1)?;
            w.write_bool(*b)
        }
        Value::Int64(n) => {
            w.write_u8(2)?;
            w.write_i64(*n)
        }
        Value::Int32(n) => {
            w.write_u8(3)?;
            w.write_i64(*n as i64)
        }
        Value::Int16(n) => {
            w.write_u8(4)?;
            w.write_i64(*n as i64)
        }
        Value::Double(n) => {
            w.write_u8(5)?;
            w.write_f64(*n)
        }
        Value::Float(n) => {
            w.write_u8(6)?;
            w.write_f64(*n as f64)
        }
        Value::String(s) => {
            w.write_u8(7)?;
            w.write_str(s)
        }
        Value::Bytes(b) => {
            w.write_u8(8)?;
            w.write_bytes(b)
        }
        Value::List(items) => {
            w.write_u8(9)?;
            w.write_u64(items.len() as u64)?;
            for item in items {
                write_value(w, item)?;
            }
            Ok(())
        }
        Value::Struct(fields) => {
            w.write_u8(10)?;
            w.write_u64(fields.len() as u64)?;
            for (name, value) in fields {
                w.write_str(name)?;
                write_value(w, value)?;
            }
            Ok(())
        }
    }
}

fn read_value<R: Read + ?Sized>(r: &mut R) -> Result<Value> {
    Ok(match r.read_u8()? {
        0 => Value::Null(read_logical_type(r)?),
        1 => Value::Bool(r.read_bool()?),
        2 => Value::Int64(r.read_i64()?),
        3 => Value::Int32(r.read_i64()? as i32),
        4 => Value::Int16(r.read_i64()? as i16),
        5 => Value::Double(r.read_f64()?),
        6 => Value::Float(r.read_f64()? as f32),
        7 => Value::String(r.read_str()?),
        8 => Value::Bytes(r.read_bytes()?),
        9 => {
            let n = r.read_u64()? as usize;
            let mut items = Vec::with_capacity(n);
            for _ in 0..n {
                items.push(read_value(r)?);
            }
            Value::List(items)
        }
        10 => {
            let n = r.read_u64()? as usize;
            let mut fields = Vec::with_capacity(n);
            for _ in 0..n {
                let name = r.read_str()?;
                fields.push((name, read_value(r)?));
            }
            Value::Struct(fields)
        }
        tag => return Err(CatalogError::Io(format!("unknown Value tag {tag}"))),
    })
}

fn write_property<W: Write + ?Sized>(w: &mut W, p: &PropertyDefinition) -> Result<()> {
    w.write_str(&p.name)?;
    write_logical_type(w, &p.logical_type)?;
    write_value(w, &p.default)?;
    w.write_u64(p.property_id.0)?;
    w.write_u64(p.column_id.0)?;
    w.write_u64(p.owner.0)
}

fn read_property<R: Read + ?Sized>(r: &mut R) -> Result<PropertyDefinition> {
    let name = r.read_str()?;
    let logical_type = read_logical_type(r)?;
    let default = read_value(r)?;
    let property_id = PropertyId(r.read_u64()?);
    let column_id = ColumnId(r.read_u64()?);
    let owner = TableId(r.read_u64()?);
    Ok(PropertyDefinition {
        name,
        logical_type,
        default,
        property_id,
        column_id,
        owner,
    })
}

fn write_properties<W: Write + ?Sized>(w: &mut W, props: &[PropertyDefinition]) -> Result<()> {
    w.write_u64(props.len() as u64)?;
    for p in props {
        write_property(w, p)?;
    }
    Ok(())
}

fn read_properties<R: Read + ?Sized>(r: &mut R) -> Result<Vec<PropertyDefinition>> {
    let n = r.read_u64()? as usize;
    let mut out = Vec::with_capacity(n);
    for _ in 0..n {
        out.push(read_property(r)?);
    }
    Ok(out)
}

fn write_node_table<W: Write + ?Sized>(w: &mut W, e: &NodeTableCatalogEntry) -> Result<()> {
    w.write_u64(e.table_id.0)?;
    w.write_str(&e.name)?;
    w.write_str(&e.comment)?;
    write_properties(w, &e.properties)?;
    w.write_u64(e.primary_key_property_id.0)?;
    w.write_u64(e.next_property_id.0)?;
    w.write_u64(e.next_column_id.0)?;
    w.write_u64(e.fwd_rel_table_ids.len() as u64)?;
    for id in &e.fwd_rel_table_ids {
        w.write_u64(id.0)?;
    }
    w.write_u64(e.bwd_rel_table_ids.len() as u64)?;
    for id in &e.bwd_rel_table_ids {
        w.write_u64(id.0)?;
    }
    Ok(())
}

fn read_node_table<R: Read + ?Sized>(r: &mut R) -> Result<NodeTableCatalogEntry> {
    let table_id = TableId(r.read_u64()?);
    let name = r.read_str()?;
    let comment = r.read_str()?;
    let properties = read_properties(r)?;
    let primary_key_property_id = PropertyId(r.read_u64()?);
    let next_property_id = PropertyId(r.read_u64()?);
    let next_column_id = ColumnId(r.read_u64()?);
    let fwd_n = r.read_u64()?;
    let mut fwd_rel_table_ids = BTreeSet::new();
    for _ in 0..fwd_n {
        fwd_rel_table_ids.insert(TableId(r.read_u64()?));
    }
    let bwd_n = r.read_u64()?;
    let mut bwd_rel_table_ids = BTreeSet::new();
    for _ in 0..bwd_n {
        bwd_rel_table_ids.insert(TableId(r.read_u64()?));
    }
    Ok(NodeTableCatalogEntry {
        table_id,
        name,
        comment,
        properties,
        primary_key_property_id,
        next_property_id,
        next_column_id,
        fwd_rel_table_ids,
        bwd_rel_table_ids,
    })
}

fn write_multiplicity<W: Write + ?Sized>(w: &mut W, m: Multiplicity) -> Result<()> {
    w.write_u8(match m {
        Multiplicity::One => 0,
        Multiplicity::Many => 1,
    })
}

fn read_multiplicity<R: Read + ?Sized>(r: &mut R) -> Result<Multiplicity> {
    Ok(match r.read_u8()? {
        0 => Multiplicity::One,
        1 => Multiplicity::Many,
        tag => return Err(CatalogError::Io(format!("unknown Multiplicity tag {tag}"))),
    })
}

fn write_rel_table<W: Write + ?Sized>(w: &mut W, e: &RelTableCatalogEntry) -> Result<()> {
    w.write_u64(e.table_id.0)?;
    w.write_str(&e.name)?;
    w.write_str(&e.comment)?;
    w.write_u64(e.src_table_id.0)?;
    w.write_u64(e.dst_table_id.0)?;
    write_multiplicity(w, e.src_multiplicity)?;
    write_multiplicity(w, e.dst_multiplicity)?;
    write_properties(w, &e.properties)?;
    w.write_u64(e.next_property_id.0)?;
    w.write_u64(e.next_column_id.0)
}

fn read_rel_table<R: Read + ?Sized>(r: &mut R) -> Result<RelTableCatalogEntry> {
    let table_id = TableId(r.read_u64()?);
    let name = r.read_str()?;
    let comment = r.read_str()?;
    let src_table_id = TableId(r.read_u64()?);
    let dst_table_id = TableId(r.read_u64()?);
    let src_multiplicity = read_multiplicity(r)?;
    let dst_multiplicity = read_multiplicity(r)?;
    let properties = read_properties(r)?;
    let next_property_id = PropertyId(r.read_u64()?);
    let next_column_id = ColumnId(r.read_u64()?);
    Ok(RelTableCatalogEntry {
        table_id,
        name,
        comment,
        src_table_id,
        dst_table_id,
        src_multiplicity,
        dst_multiplicity,
        properties,
        next_property_id,
        next_column_id,
    })
}

fn write_rel_group<W: Write + ?Sized>(w: &mut W, e: &RelGroupCatalogEntry) -> Result<()> {
    w.write_u64(e.table_id.0)?;
    w.write_str(&e.name)?;
    w.write_u64(e.child_rel_table_ids.len() as u64)?;
    for id in &e.child_rel_table_ids {
        w.write_u64(id.0)?;
    }
    Ok(())
}

fn read_rel_group<R: Read + ?Sized>(r: &mut R) -> Result<RelGroupCatalogEntry> {
    let table_id = TableId(r.read_u64()?);
    let name = r.read_str()?;
    let n = r.read_u64()?;
    let mut child_rel_table_ids = Vec::with_capacity(n as usize);
    for _ in 0..n {
        child_rel_table_ids.push(TableId(r.read_u64()?));
    }
    Ok(RelGroupCatalogEntry {
        table_id,
        name,
        child_rel_table_ids,
    })
}

fn write_index<W: Write + ?Sized>(w: &mut W, e: &IndexCatalogEntry) -> Result<()> {
    w.write_u64(e.index_id.0)?;
    w.write_u64(e.table_id.0)?;
    w.write_str(&e.name)?;
    w.write_u64(e.property_ids.len() as u64)?;
    for id in &e.property_ids {
        w.write_u64(id.0)?;
    }
    w.write_u8(match e.kind {
        IndexKind::Hnsw => 0,
        IndexKind::PrimaryKey => 1,
    })?;
    w.write_bytes(&e.aux)
}

fn read_index<R: Read + ?Sized>(r: &mut R) -> Result<IndexCatalogEntry> {
    let index_id = IndexId(r.read_u64()?);
    let table_id = TableId(r.read_u64()?);
    let name = r.read_str()?;
    let n = r.read_u64()?;
    let mut property_ids = Vec::with_capacity(n as usize);
    for _ in 0..n {
        property_ids.push(PropertyId(r.read_u64()?));
    }
    let kind = match r.read_u8()? {
        0 => IndexKind::Hnsw,
        1 => IndexKind::PrimaryKey,
        tag => return Err(CatalogError::Io(format!("unknown IndexKind tag {tag}"))),
    };
    let aux = r.read_bytes()?;
    Ok(IndexCatalogEntry {
        index_id,
        table_id,
        name,
        property_ids,
        kind,
        aux,
    })
}

fn write_macro<W: Write + ?Sized>(w: &mut W, e: &MacroCatalogEntry) -> Result<()> {
    w.write_str(&e.name)?;
    w.write_u64(e.parameter_names.len() as u64)?;
    for p in &e.parameter_names {
        w.write_str(p)?;
    }
    w.write_bytes(&e.body)
}

fn read_macro<R: Read + ?Sized>(r: &mut R) -> Result<MacroCatalogEntry> {
    let name = r.read_str()?;
    let n = r.read_u64()?;
    let mut parameter_names = Vec::with_capacity(n as usize);
    for _ in 0..n {
        parameter_names.push(r.read_str()?);
    }
    let body = r.read_bytes()?;
    Ok(MacroCatalogEntry {
        name,
        parameter_names,
        body,
    })
}

impl Catalog {
    pub fn serialize(&self) -> Result<Vec<u8>> {
        let mut buf = Vec::new();
        buf.write_all(MAGIC).map_err(io_err)?;
        buf.write_u64(STORAGE_VERSION)?;
        buf.write_u64(self.next_table_id)?;
        buf.write_u64(self.next_index_id)?;

        buf.write_u64(self.node_tables.len() as u64)?;
        for e in self.node_tables.values() {
            buf.write_u8(CatalogEntryType::NodeTable as u8)?;
            write_node_table(&mut buf, e)?;
        }
        buf.write_u64(self.rel_tables.len() as u64)?;
        for e in self.rel_tables.values() {
            buf.write_u8(CatalogEntryType::RelTable as u8)?;
            write_rel_table(&mut buf, e)?;
        }
        buf.write_u64(self.rel_groups.len() as u64)?;
        for e in self.rel_groups.values() {
            buf.write_u8(CatalogEntryType::RelGroup as u8)?;
            write_rel_group(&mut buf, e)?;
        }
        buf.write_u64(self.indexes.len() as u64)?;
        for e in self.indexes.values() {
            buf.write_u8(CatalogEntryType::Index as u8)?;
            write_index(&mut buf, e)?;
        }
        buf.write_u64(self.macros.len() as u64)?;
        for e in self.macros.values() {
            buf.write_u8(CatalogEntryType::Macro as u8)?;
            write_macro(&mut buf, e)?;
        }
        Ok(buf)
    }

    pub fn deserialize(bytes: &[u8]) -> Result<Catalog> {
        let mut r = Cursor::new(bytes);
        let mut magic = [0u8; 4];
        r.read_exact(&mut magic).map_err(io_err)?;
        if &magic != MAGIC {
            return Err(CatalogError::BadMagic);
        }
        let version = r.read_u64()?;
        if version != STORAGE_VERSION {
            return Err(CatalogError::VersionMismatch {
                expected: STORAGE_VERSION,
                found: version,
            });
        }
        let next_table_id = r.read_u64()?;
        let next_index_id = r.read_u64()?;

        let mut node_tables = HashMap::new();
        let mut name_to_id = HashMap::new();
        let node_count = r.read_u64()?;
        for _ in 0..node_count {
            let tag = r.read_u8()?;
            debug_assert_eq!(tag, CatalogEntryType::NodeTable as u8);
            let e = read_node_table(&mut r)?;
            name_to_id.insert(e.name.clone(), e.table_id);
            node_tables.insert(e.table_id, e);
        }

        let mut rel_tables = HashMap::new();
        let rel_count = r.read_u64()?;
        for _ in 0..rel_count {
            let tag = r.read_u8()?;
            debug_assert_eq!(tag, CatalogEntryType::RelTable as u8);
            let e = read_rel_table(&mut r)?;
            name_to_id.insert(e.name.clone(), e.table_id);
            rel_tables.insert(e.table_id, e);
        }

        let mut rel_groups = HashMap::new();
        let group_count = r.read_u64()?;
        for _ in 0..group_count {
            let tag = r.read_u8()?;
            debug_assert_eq!(tag, CatalogEntryType::RelGroup as u8);
            let e = read_rel_group(&mut r)?;
            name_to_id.insert(e.name.clone(), e.table_id);
            rel_groups.insert(e.table_id, e);
        }

        let mut indexes = HashMap::new();
        let index_count = r.read_u64()?;
        for _ in 0..index_count {
            let tag = r.read_u8()?;
            debug_assert_eq!(tag, CatalogEntryType::Index as u8);
            let e = read_index(&mut r)?;
            indexes.insert(e.index_id, e);
        }

        let mut macros = HashMap::new();
        let macro_count = r.read_u64()?;
        for _ in 0..macro_count {
            let tag = r.read_u8()?;
            debug_assert_eq!(tag, CatalogEntryType::Macro as u8);
            let e = read_macro(&mut r)?;
            macros.insert(e.name.clone(), e);
        }

        Ok(Catalog {
            node_tables,
            rel_tables,
            rel_groups,
            indexes,
            macros,
            name_to_id,
            next_table_id,
            next_index_id,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::{CreateIndexInfo, CreateNodeTableInfo, CreateRelTableInfo, PropertySpec};

    fn sample_catalog() -> Catalog {
        let mut cat = Catalog::new();
        let person = cat
            .create_node_table(CreateNodeTableInfo {
                name: "Person".into(),
                properties: vec![
                    PropertySpec::new("id", LogicalType::Serial),
                    PropertySpec::new("name", LogicalType::String).with_default(Value::String("anon".into())),
                ],
                primary_key_name: "id".into(),
            })
            .unwrap();
        cat.create_rel_table(CreateRelTableInfo {
            name: "Knows".into(),
            src_table_id: person,
            dst_table_id: person,
            src_multiplicity: Multiplicity::Many,
            dst_multiplicity: Multiplicity::Many,
            properties: vec![PropertySpec::new("since", LogicalType::Date)],
        })
        .unwrap();
        cat.create_index(CreateIndexInfo {
            table_id: person,
            name: "person_pk".into(),
            property_ids: vec![PropertyId(0)],
            kind: IndexKind::PrimaryKey,
            aux: vec![],
        })
        .unwrap();
        cat
    }

    #[test]
    fn round_trip_preserves_every_entry() {
        let cat = sample_catalog();
        let bytes = cat.serialize().unwrap();
        let restored = Catalog::deserialize(&bytes).unwrap();
        assert_eq!(restored.node_tables.len(), cat.node_tables.len());
        assert_eq!(restored.rel_tables.len(), cat.rel_tables.len());
        assert_eq!(restored.indexes.len(), cat.indexes.len());
        assert_eq!(restored.next_table_id, cat.next_table_id);
        assert!(restored.contains_table("Person"));
        assert!(restored.contains_table("Knows"));
        let person_id = restored.get_table_id("Person").unwrap();
        assert_eq!(
            restored.get_node_table(person_id).unwrap().primary_key().name,
            "id"
        );
    }

    #[test]
    fn bad_magic_is_rejected() {
        let err = Catalog::deserialize(b"NOPE0000").unwrap_err();
        assert_eq!(err, CatalogError::BadMagic);
    }

    #[test]
    fn scenario_schema_evolution_round_trips() {
        let mut cat = sample_catalog();
        let person_id = cat.get_table_id("Person").unwrap();
        cat.drop_property(person_id, "name").unwrap();
        cat.add_property(person_id, PropertySpec::new("age", LogicalType::Int32))
            .unwrap();
        cat.rename_table(person_id, "Human").unwrap();

        let bytes = cat.serialize().unwrap();
        let restored = Catalog::deserialize(&bytes).unwrap();
        let human_id = restored.get_table_id("Human").unwrap();
        let human = restored.get_node_table(human_id).unwrap();
        assert!(!human.contains_property("name"));
        assert!(human.contains_property("age"));
    }
}
