//! Entity description types: tables, columns, foreign keys.

use std::collections::HashMap;

/// Spatial reference used for every geometry column.
pub const SRID: u32 = 4326;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum GeometryKind {
    Point,
    LineString,
}

impl GeometryKind {
    pub fn type_name(self) -> &'static str {
        match self {
            GeometryKind::Point => "POINT",
            GeometryKind::LineString => "LINESTRING",
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ColumnType {
    Int,
    Numeric,
    Text,
    VarChar(u16),
    Date,
    Timestamptz,
    Geometry(GeometryKind),
}

impl ColumnType {
    /// SQL type for DDL.
    pub fn sql_type(self) -> String {
        match self {
            ColumnType::Int => "INTEGER".into(),
            ColumnType::Numeric => "NUMERIC".into(),
            ColumnType::Text => "TEXT".into(),
            ColumnType::VarChar(n) => format!("VARCHAR({})", n),
            ColumnType::Date => "DATE".into(),
            ColumnType::Timestamptz => "TIMESTAMPTZ".into(),
            ColumnType::Geometry(kind) => format!("GEOMETRY({}, {})", kind.type_name(), SRID),
        }
    }

    /// Cast suffix for bound placeholders (`$n::numeric`), where a plain bind
    /// would reach PostgreSQL with the wrong wire type. Geometry has no cast;
    /// it binds through ST_GeomFromText.
    pub fn cast(self) -> Option<&'static str> {
        match self {
            ColumnType::Numeric => Some("numeric"),
            ColumnType::Date => Some("date"),
            ColumnType::Timestamptz => Some("timestamptz"),
            _ => None,
        }
    }

    pub fn is_geometry(self) -> bool {
        matches!(self, ColumnType::Geometry(_))
    }
}

/// ON DELETE action of a foreign-key edge. Each edge's policy is part of the
/// schema contract and is preserved exactly.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FkAction {
    Cascade,
    SetNull,
}

impl FkAction {
    pub fn sql(self) -> &'static str {
        match self {
            FkAction::Cascade => "CASCADE",
            FkAction::SetNull => "SET NULL",
        }
    }
}

#[derive(Clone, Copy, Debug)]
pub struct Reference {
    /// Referenced table name (same schema).
    pub table: &'static str,
    pub column: &'static str,
    pub on_delete: FkAction,
}

#[derive(Clone, Debug)]
pub struct ColumnDef {
    pub name: &'static str,
    pub ty: ColumnType,
    pub primary_key: bool,
    pub nullable: bool,
    /// SQL default expression, verbatim in DDL.
    pub default: Option<&'static str>,
    pub unique: bool,
    pub references: Option<Reference>,
}

impl ColumnDef {
    fn new(name: &'static str, ty: ColumnType) -> Self {
        ColumnDef {
            name,
            ty,
            primary_key: false,
            nullable: true,
            default: None,
            unique: false,
            references: None,
        }
    }

    pub fn pk(name: &'static str) -> Self {
        ColumnDef {
            primary_key: true,
            nullable: false,
            ..Self::new(name, ColumnType::Int)
        }
    }

    pub fn required(name: &'static str, ty: ColumnType) -> Self {
        ColumnDef {
            nullable: false,
            ..Self::new(name, ty)
        }
    }

    pub fn optional(name: &'static str, ty: ColumnType) -> Self {
        Self::new(name, ty)
    }

    pub fn with_default(mut self, expr: &'static str) -> Self {
        self.default = Some(expr);
        self
    }

    pub fn unique(mut self) -> Self {
        self.unique = true;
        self
    }

    pub fn fk(mut self, table: &'static str, column: &'static str, on_delete: FkAction) -> Self {
        self.references = Some(Reference {
            table,
            column,
            on_delete,
        });
        self
    }

    /// A value must be supplied by the caller on create: NOT NULL, no DB
    /// default, and not the generated primary key.
    pub fn required_on_create(&self) -> bool {
        !self.nullable && !self.primary_key && self.default.is_none()
    }
}

#[derive(Clone, Debug)]
pub struct EntityDef {
    pub table: &'static str,
    /// URL path segment under the API prefix.
    pub path_segment: &'static str,
    pub columns: Vec<ColumnDef>,
}

impl EntityDef {
    pub fn pk_column(&self) -> &ColumnDef {
        self.columns
            .iter()
            .find(|c| c.primary_key)
            .unwrap_or(&self.columns[0])
    }

    pub fn column(&self, name: &str) -> Option<&ColumnDef> {
        self.columns.iter().find(|c| c.name == name)
    }
}

#[derive(Clone, Debug)]
pub struct NetworkModel {
    /// Schema all entity tables live in.
    pub schema: &'static str,
    pub entities: Vec<EntityDef>,
    by_path: HashMap<&'static str, usize>,
}

impl NetworkModel {
    pub fn new(schema: &'static str, entities: Vec<EntityDef>) -> Self {
        let by_path = entities
            .iter()
            .enumerate()
            .map(|(i, e)| (e.path_segment, i))
            .collect();
        NetworkModel {
            schema,
            entities,
            by_path,
        }
    }

    pub fn entity_by_path(&self, path: &str) -> Option<&EntityDef> {
        self.by_path.get(path).map(|&i| &self.entities[i])
    }
}
