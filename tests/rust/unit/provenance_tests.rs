//! Unit tests for the provenance algebra
//!
//! Join conditions over nested (flattened) provenance, structural components
//! and union alternatives.

#[cfg(test)]
mod provenance_tests {
    use qsu_planner::query_planner::{
        map_func::{Hole, JoinSide, MapFunc},
        provenance::{
            errors::ProvenanceError, identity_rewrite, Access, DisjointProvenancePolicy, IdType,
            QDims, QProv,
        },
        symbol::Symbol,
    };
    use serde_json::json;

    fn rows_of(source: &str) -> QDims {
        QDims::value(Access::field(source, "id"), IdType::Dataset)
    }

    #[test]
    fn test_flattened_levels_are_compared_depth_by_depth() {
        let left = rows_of("a").inflate(Access::field("a", "tags"), IdType::Expr);
        let right = rows_of("b").inflate(Access::field("b", "labels"), IdType::Expr);

        let cond = QProv::default()
            .autojoin_condition(&left, &right, identity_rewrite)
            .unwrap();

        let expected = MapFunc::and_all(vec![
            MapFunc::eq(
                MapFunc::hole(JoinSide::LeftSide).project_key("id"),
                MapFunc::hole(JoinSide::RightSide).project_key("id"),
            ),
            MapFunc::eq(
                MapFunc::hole(JoinSide::LeftSide).project_key("tags"),
                MapFunc::hole(JoinSide::RightSide).project_key("labels"),
            ),
        ]);
        assert_eq!(cond, expected);
    }

    #[test]
    fn test_extra_depth_on_one_side_is_ignored() {
        let left = rows_of("a").inflate(Access::field("a", "tags"), IdType::Expr);
        let cond = QProv::default()
            .autojoin_condition(&left, &rows_of("b"), identity_rewrite)
            .unwrap();
        assert_eq!(
            cond,
            MapFunc::eq(
                MapFunc::hole(JoinSide::LeftSide).project_key("id"),
                MapFunc::hole(JoinSide::RightSide).project_key("id"),
            )
        );
    }

    #[test]
    fn test_structural_components_never_become_keys() {
        let left = rows_of("a").project_static("name".to_string(), IdType::Dataset);
        let right = rows_of("b").inject_static("name".to_string(), IdType::Dataset);
        let cond = QProv::default()
            .autojoin_condition(&left, &right, identity_rewrite)
            .unwrap();
        assert_eq!(cond.holes().len(), 2);
    }

    #[test]
    fn test_condition_evaluates_on_rows() {
        let cond = QProv::default()
            .autojoin_condition(
                &rows_of("a"),
                &rows_of("b").union(rows_of("b2")),
                |_: &Symbol| MapFunc::hole(Hole),
            )
            .unwrap();

        let eval = |l: serde_json::Value, r: serde_json::Value| {
            cond.eval(&mut |side: &JoinSide| match side {
                JoinSide::LeftSide => l.clone(),
                JoinSide::RightSide => r.clone(),
            })
        };
        assert_eq!(eval(json!({"id": 7}), json!({"id": 7})), json!(true));
        assert_eq!(eval(json!({"id": 7}), json!({"id": 8})), json!(false));
    }

    #[test]
    fn test_reject_reports_alternative_counts() {
        let left = rows_of("a").union(rows_of("a2"));
        let right = QDims::empty().inflate(Access::value("b"), IdType::Expr);
        let err = QProv::new(DisjointProvenancePolicy::Reject)
            .autojoin_condition(&left, &right, identity_rewrite)
            .unwrap_err();
        assert_eq!(
            err,
            ProvenanceError::NoCommonIdentity {
                left_alternatives: 2,
                right_alternatives: 1,
            }
        );
    }

    #[test]
    fn test_sequential_join_matches_any_grouping() {
        let (l, c, r) = (rows_of("l"), rows_of("c"), rows_of("r"));
        let qprov = QProv::default();
        let left_first = qprov.join(&qprov.join(&l, &c), &r);
        let right_first = qprov.join(&l, &qprov.join(&c, &r));
        assert_eq!(left_first, right_first);
    }

    #[test]
    fn test_dimensions_serde_roundtrip() {
        let dims = rows_of("a")
            .inflate(Access::field("a", "tags"), IdType::Expr)
            .union(rows_of("b"));
        let text = serde_json::to_string(&dims).unwrap();
        let back: QDims = serde_json::from_str(&text).unwrap();
        assert_eq!(back, dims);
    }
}
