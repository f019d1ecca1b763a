//! The fixed ten-entity distribution-network schema.
//!
//! Ownership tree: substations → feeders → transformers → poles →
//! {conductors, meters} → {switches, fuses, customers, service_points}.
//! ON DELETE policy varies per edge and is part of the contract.

use super::entity::{ColumnDef, ColumnType, EntityDef, FkAction, GeometryKind, NetworkModel};

use ColumnType::{Date, Geometry, Int, Numeric, Text, Timestamptz, VarChar};
use GeometryKind::{LineString, Point};

fn created_at() -> ColumnDef {
    ColumnDef::required("created_at", Timestamptz).with_default("NOW()")
}

pub fn network_model() -> NetworkModel {
    NetworkModel::new(
        "network",
        vec![
            EntityDef {
                table: "substations",
                path_segment: "substations",
                columns: vec![
                    ColumnDef::pk("substation_id"),
                    ColumnDef::required("substation_name", VarChar(255)),
                    ColumnDef::required("voltage_level_kv", Numeric),
                    ColumnDef::optional("status", VarChar(50)).with_default("'Active'"),
                    ColumnDef::required("geom", Geometry(Point)),
                    created_at(),
                ],
            },
            EntityDef {
                table: "feeders",
                path_segment: "feeders",
                columns: vec![
                    ColumnDef::pk("feeder_id"),
                    ColumnDef::required("feeder_name", VarChar(255)),
                    ColumnDef::required("substation_id", Int).fk(
                        "substations",
                        "substation_id",
                        FkAction::Cascade,
                    ),
                    ColumnDef::optional("voltage_level_kv", Numeric),
                    ColumnDef::required("geom", Geometry(LineString)),
                    created_at(),
                ],
            },
            EntityDef {
                table: "transformers",
                path_segment: "transformers",
                columns: vec![
                    ColumnDef::pk("transformer_id"),
                    ColumnDef::required("transformer_name", VarChar(255)),
                    ColumnDef::required("feeder_id", Int).fk(
                        "feeders",
                        "feeder_id",
                        FkAction::Cascade,
                    ),
                    ColumnDef::required("capacity_kva", Numeric),
                    ColumnDef::optional("status", VarChar(50)).with_default("'Active'"),
                    ColumnDef::required("geom", Geometry(Point)),
                    created_at(),
                ],
            },
            EntityDef {
                table: "poles",
                path_segment: "poles",
                columns: vec![
                    ColumnDef::pk("pole_id"),
                    ColumnDef::optional("transformer_id", Int).fk(
                        "transformers",
                        "transformer_id",
                        FkAction::SetNull,
                    ),
                    ColumnDef::optional("material_type", VarChar(100)),
                    ColumnDef::optional("height_meters", Numeric),
                    ColumnDef::optional("installation_year", Int),
                    ColumnDef::required("geom", Geometry(Point)),
                    created_at(),
                ],
            },
            EntityDef {
                table: "conductors",
                path_segment: "conductors",
                columns: vec![
                    ColumnDef::pk("conductor_id"),
                    ColumnDef::optional("start_pole_id", Int).fk(
                        "poles",
                        "pole_id",
                        FkAction::Cascade,
                    ),
                    ColumnDef::optional("end_pole_id", Int).fk(
                        "poles",
                        "pole_id",
                        FkAction::Cascade,
                    ),
                    ColumnDef::optional("conductor_type", VarChar(100)),
                    ColumnDef::optional("voltage_rating_kv", Numeric),
                    ColumnDef::required("geom", Geometry(LineString)),
                    created_at(),
                ],
            },
            EntityDef {
                table: "switches",
                path_segment: "switches",
                columns: vec![
                    ColumnDef::pk("switch_id"),
                    ColumnDef::optional("conductor_id", Int).fk(
                        "conductors",
                        "conductor_id",
                        FkAction::Cascade,
                    ),
                    ColumnDef::optional("switch_type", VarChar(100)),
                    ColumnDef::optional("operational_status", VarChar(50)).with_default("'Closed'"),
                    ColumnDef::required("geom", Geometry(Point)),
                    created_at(),
                ],
            },
            EntityDef {
                table: "fuses",
                path_segment: "fuses",
                columns: vec![
                    ColumnDef::pk("fuse_id"),
                    ColumnDef::optional("conductor_id", Int).fk(
                        "conductors",
                        "conductor_id",
                        FkAction::Cascade,
                    ),
                    ColumnDef::optional("fuse_rating_amps", Int),
                    ColumnDef::optional("operational_status", VarChar(50))
                        .with_default("'Operational'"),
                    ColumnDef::required("geom", Geometry(Point)),
                    created_at(),
                ],
            },
            EntityDef {
                table: "meters",
                path_segment: "meters",
                columns: vec![
                    ColumnDef::pk("meter_id"),
                    ColumnDef::optional("pole_id", Int).fk("poles", "pole_id", FkAction::SetNull),
                    ColumnDef::required("meter_number", VarChar(255)).unique(),
                    ColumnDef::optional("installation_date", Date),
                    ColumnDef::required("geom", Geometry(Point)),
                    created_at(),
                ],
            },
            EntityDef {
                table: "customers",
                path_segment: "customers",
                columns: vec![
                    ColumnDef::pk("customer_id"),
                    ColumnDef::required("customer_name", VarChar(255)),
                    ColumnDef::optional("address", Text),
                    ColumnDef::optional("contact_number", VarChar(20)),
                    ColumnDef::optional("meter_id", Int).fk("meters", "meter_id", FkAction::SetNull),
                    created_at(),
                ],
            },
            EntityDef {
                table: "service_points",
                path_segment: "service-points",
                columns: vec![
                    ColumnDef::pk("service_point_id"),
                    ColumnDef::optional("meter_id", Int).fk("meters", "meter_id", FkAction::Cascade),
                    ColumnDef::optional("service_status", VarChar(50)).with_default("'Active'"),
                    ColumnDef::required("geom", Geometry(Point)),
                    created_at(),
                ],
            },
        ],
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::entity::{ColumnType, FkAction};
    use pretty_assertions::assert_eq;

    #[test]
    fn has_all_ten_entities() {
        let model = network_model();
        assert_eq!(model.entities.len(), 10);
        for segment in [
            "substations",
            "feeders",
            "transformers",
            "poles",
            "conductors",
            "switches",
            "fuses",
            "meters",
            "customers",
            "service-points",
        ] {
            assert!(model.entity_by_path(segment).is_some(), "{segment}");
        }
        assert!(model.entity_by_path("nonexistent").is_none());
    }

    #[test]
    fn cascade_policy_is_preserved_per_edge() {
        let model = network_model();
        let on_delete = |table: &str, column: &str| {
            model
                .entities
                .iter()
                .find(|e| e.table == table)
                .and_then(|e| e.column(column))
                .and_then(|c| c.references)
                .map(|r| r.on_delete)
        };
        assert_eq!(on_delete("feeders", "substation_id"), Some(FkAction::Cascade));
        assert_eq!(on_delete("transformers", "feeder_id"), Some(FkAction::Cascade));
        assert_eq!(on_delete("poles", "transformer_id"), Some(FkAction::SetNull));
        assert_eq!(on_delete("conductors", "start_pole_id"), Some(FkAction::Cascade));
        assert_eq!(on_delete("conductors", "end_pole_id"), Some(FkAction::Cascade));
        assert_eq!(on_delete("switches", "conductor_id"), Some(FkAction::Cascade));
        assert_eq!(on_delete("fuses", "conductor_id"), Some(FkAction::Cascade));
        assert_eq!(on_delete("meters", "pole_id"), Some(FkAction::SetNull));
        assert_eq!(on_delete("customers", "meter_id"), Some(FkAction::SetNull));
        assert_eq!(on_delete("service_points", "meter_id"), Some(FkAction::Cascade));
    }

    #[test]
    fn every_entity_but_customers_has_required_geometry() {
        let model = network_model();
        for e in &model.entities {
            let geom = e.column("geom");
            if e.table == "customers" {
                assert!(geom.is_none());
            } else {
                let geom = geom.expect(e.table);
                assert!(geom.ty.is_geometry());
                assert!(!geom.nullable);
            }
        }
    }

    #[test]
    fn meter_number_is_unique_and_required() {
        let model = network_model();
        let meters = model.entity_by_path("meters").unwrap();
        let col = meters.column("meter_number").unwrap();
        assert!(col.unique);
        assert!(col.required_on_create());
        assert_eq!(col.ty, ColumnType::VarChar(255));
    }

    #[test]
    fn pk_columns_are_named_after_the_table() {
        let model = network_model();
        let subs = model.entity_by_path("substations").unwrap();
        assert_eq!(subs.pk_column().name, "substation_id");
        let sp = model.entity_by_path("service-points").unwrap();
        assert_eq!(sp.pk_column().name, "service_point_id");
    }
}
