//! Small entities for exercising repositories and lists.

use std::cmp::Ordering;

use enforcer_db_core::{
    Connection, Entity, FieldInfo, ForeignKey, NamedRow, RecordMeta, Relation, Result,
    TableSchema, Value, ValueKind, ValueSet,
};
use enforcer_db_memory::MemoryConnection;

static WIDGET_FIELDS: &[FieldInfo] = &[
    FieldInfo::new("name", ValueKind::Text).unique(true),
    FieldInfo::new("size", ValueKind::UInt32),
];
static WIDGET: TableSchema = TableSchema::new("widget", WIDGET_FIELDS);

static GADGET_FIELDS: &[FieldInfo] = &[
    FieldInfo::reference("widget_id", "widget"),
    FieldInfo::new("label", ValueKind::Text).nullable(true),
];
static GADGET: TableSchema = TableSchema::new("gadget", GADGET_FIELDS);

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Widget {
    pub meta: RecordMeta,
    pub name: Option<String>,
    pub size: u32,
}

impl Entity for Widget {
    const TABLE_NAME: &'static str = "widget";

    fn schema() -> &'static TableSchema {
        &WIDGET
    }

    fn meta(&self) -> &RecordMeta {
        &self.meta
    }

    fn meta_mut(&mut self) -> &mut RecordMeta {
        &mut self.meta
    }

    fn to_values(&self) -> Result<ValueSet> {
        let mut set = ValueSet::new();
        set.push("name", self.name.clone().map_or(Value::Null, Value::Text));
        set.push("size", self.size);
        Ok(set)
    }

    fn decode_fields(&mut self, row: &NamedRow<'_>) -> Result<()> {
        self.name = row.optional_text("name")?;
        self.size = row.uint32("size")?;
        Ok(())
    }

    fn compare(&self, other: &Self) -> Ordering {
        self.name
            .cmp(&other.name)
            .then_with(|| self.size.cmp(&other.size))
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Gadget {
    pub meta: RecordMeta,
    pub widget_id: ForeignKey<Widget>,
    pub label: Option<String>,
}

fn widget_fk(g: &Gadget) -> &ForeignKey<Widget> {
    &g.widget_id
}

fn widget_fk_mut(g: &mut Gadget) -> &mut ForeignKey<Widget> {
    &mut g.widget_id
}

impl Gadget {
    pub const WIDGET: Relation<Gadget, Widget> =
        Relation::new("widget_id", widget_fk, widget_fk_mut);
}

impl Entity for Gadget {
    const TABLE_NAME: &'static str = "gadget";

    fn schema() -> &'static TableSchema {
        &GADGET
    }

    fn meta(&self) -> &RecordMeta {
        &self.meta
    }

    fn meta_mut(&mut self) -> &mut RecordMeta {
        &mut self.meta
    }

    fn to_values(&self) -> Result<ValueSet> {
        let mut set = ValueSet::new();
        set.push("widget_id", self.widget_id.value());
        set.push("label", self.label.clone().map_or(Value::Null, Value::Text));
        Ok(set)
    }

    fn decode_fields(&mut self, row: &NamedRow<'_>) -> Result<()> {
        self.widget_id = row
            .foreign_key("widget_id")?
            .map(ForeignKey::with_key)
            .unwrap_or_default();
        self.label = row.optional_text("label")?;
        Ok(())
    }

    fn compare(&self, other: &Self) -> Ordering {
        self.widget_id
            .cmp(&other.widget_id)
            .then_with(|| self.label.cmp(&other.label))
    }
}

pub fn register(conn: &MemoryConnection) {
    conn.register(&WIDGET).unwrap();
    conn.register(&GADGET).unwrap();
}

pub fn connection() -> MemoryConnection {
    let conn = MemoryConnection::new();
    register(&conn);
    conn
}
