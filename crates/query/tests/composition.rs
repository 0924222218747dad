//! Joins, unions and subqueries across operands of one composition graph

mod common;

use common::collapse;
use serde_json::json;
use sqlweave_query::{JoinKind, QueryBuilder, QueryContext, QueryError};

#[test]
fn test_join_keeps_equally_named_parameters_apart() {
    let context = QueryContext::new();
    let orders = context.table::<()>("Orders").where_eq("Status", "open").into_builder();
    let customers = context
        .table::<()>("Customers")
        .where_eq("Status", "vip")
        .into_builder();

    let query = orders
        .join(&customers, JoinKind::InnerJoin)
        .unwrap()
        .on("CustomerId", "Id")
        .into_builder();

    assert_eq!(
        collapse(&query.to_sql()),
        "SELECT [ALIAS_GENERATED_1].* \
         FROM (SELECT * FROM dbo.[Orders] WHERE ([Status] = @Status_0)) [ALIAS_GENERATED_1] \
         INNER JOIN (SELECT * FROM dbo.[Customers] WHERE ([Status] = @Status_1)) [ALIAS_GENERATED_2] \
         ON [ALIAS_GENERATED_1].[CustomerId] = [ALIAS_GENERATED_2].[Id] \
         ORDER BY [ALIAS_GENERATED_1].[Id]"
    );
    assert_eq!(query.parameters().names(), vec!["Status_0", "Status_1"]);
    assert_eq!(query.values_for("Status"), vec![&json!("open"), &json!("vip")]);
}

#[test]
fn test_union_keeps_equally_named_parameters_apart() {
    let context = QueryContext::new();
    let open = context.table::<()>("Orders").where_eq("Status", "open").into_builder();
    let archived = context
        .table::<()>("ArchivedOrders")
        .where_eq("Status", "closed")
        .into_builder();

    let query = open.union(&archived).unwrap();

    assert_eq!(
        collapse(&query.to_sql()),
        "SELECT * FROM (SELECT * FROM dbo.[Orders] WHERE ([Status] = @Status_0) \
         UNION \
         SELECT * FROM dbo.[ArchivedOrders] WHERE ([Status] = @Status_1)) [ALIAS_GENERATED_1] \
         ORDER BY [Id]"
    );
    assert_eq!(query.parameter_values().get("Status_0"), Some(&json!("open")));
    assert_eq!(query.parameter_values().get("Status_1"), Some(&json!("closed")));
    assert_eq!(query.values_for("Status").len(), 2);
}

#[test]
fn test_self_join_shares_parameter_binding() {
    let context = QueryContext::new();
    let orders = context.table::<()>("Orders").where_gt("Total", 100).into_builder();

    let query = orders
        .clone()
        .inner_join(&orders)
        .unwrap()
        .on("CustomerId", "CustomerId")
        .into_builder();

    assert_eq!(
        collapse(&query.to_sql()),
        "SELECT [ALIAS_GENERATED_1].* \
         FROM (SELECT * FROM dbo.[Orders] WHERE ([Total] > @Total_0)) [ALIAS_GENERATED_1] \
         INNER JOIN (SELECT * FROM dbo.[Orders] WHERE ([Total] > @Total_0)) [ALIAS_GENERATED_2] \
         ON [ALIAS_GENERATED_1].[CustomerId] = [ALIAS_GENERATED_2].[CustomerId] \
         ORDER BY [ALIAS_GENERATED_1].[Id]"
    );
    assert_eq!(query.parameters().names(), vec!["Total_0"]);
    assert_eq!(query.values_for("Total"), vec![&json!(100)]);
}

#[test]
fn test_union_of_variants_shares_base_binding() {
    let context = QueryContext::new();
    let base = context.table::<()>("Orders").where_eq("Region", "EU").into_builder();
    let open = base.clone().where_eq("Status", "open").into_builder();
    let closed = base.where_eq("Status", "closed").into_builder();

    let query = open.union(&closed).unwrap();

    assert_eq!(
        collapse(&query.to_sql()),
        "SELECT * FROM (SELECT * FROM dbo.[Orders] \
         WHERE ([Region] = @Region_0) AND ([Status] = @Status_1) \
         UNION \
         SELECT * FROM dbo.[Orders] \
         WHERE ([Region] = @Region_0) AND ([Status] = @Status_2)) [ALIAS_GENERATED_1] \
         ORDER BY [Id]"
    );
    assert_eq!(query.parameters().names(), vec!["Region_0", "Status_1", "Status_2"]);
    assert_eq!(query.values_for("Region"), vec![&json!("EU")]);
    assert_eq!(query.values_for("Status"), vec![&json!("open"), &json!("closed")]);
}

#[test]
fn test_variant_with_rebound_value_is_rejected() {
    let context = QueryContext::new();
    let base = context
        .table::<()>("Orders")
        .where_raw("[Region] = @region")
        .bind_value("region", "EU")
        .unwrap();
    let other = base.clone().bind_value("region", "US").unwrap();

    let err = base.union(&other).unwrap_err();
    assert_eq!(
        err,
        QueryError::DuplicateParameter {
            operation: "union".to_string(),
            name: "region".to_string()
        }
    );
}

#[test]
fn test_operands_are_not_mutated_by_composition() {
    let context = QueryContext::new();
    let orders = context.table::<()>("Orders").order_by("Date");
    let customers = context.table::<()>("Customers").where_eq("Region", "EU").into_builder();

    let orders_sql = orders.to_sql();
    let customers_sql = customers.to_sql();

    let _joined = orders
        .clone()
        .left_hash_join(&customers)
        .unwrap()
        .on("CustomerId", "Id")
        .into_builder();
    let _unioned = orders.clone().union(&customers).unwrap();

    assert_eq!(orders.to_sql(), orders_sql);
    assert_eq!(customers.to_sql(), customers_sql);
    assert!(orders.to_sql().ends_with("ORDER BY [Date]"));
}

#[test]
fn test_join_then_filter_and_page() {
    let context = QueryContext::new();
    let orders = context.table::<()>("Orders").order_by_desc("Date");
    let lines = context.table::<()>("OrderLines");

    let query = orders
        .inner_join(&lines)
        .unwrap()
        .on("Id", "OrderId")
        .into_builder()
        .where_gt("Total", 100)
        .into_builder()
        .page(0, 25);

    let sql = collapse(&query.to_sql());
    assert!(sql.contains(
        "ROW_NUMBER() OVER (ORDER BY [ALIAS_GENERATED_1].[Date] DESC) AS [RowNumber]"
    ));
    assert!(sql.contains("WHERE ([ALIAS_GENERATED_1].[Total] > @Total_0)"));
    assert!(sql.ends_with("WHERE ([RowNumber] BETWEEN @RowStart_1 AND @RowEnd_2) ORDER BY [RowNumber]"));
    assert_eq!(query.parameter_values().len(), 3);
}

#[test]
fn test_nested_composition_keeps_every_name_unique() {
    let context = QueryContext::new();
    let base = |table: &str| {
        context
            .table::<()>(table)
            .where_in("Status", vec![1, 2])
            .into_builder()
    };

    let query = base("A")
        .union(&base("B"))
        .unwrap()
        .inner_join(&base("C").subquery())
        .unwrap()
        .on("Id", "Id")
        .into_builder();

    let names = query.parameters().names();
    let mut unique = names.clone();
    unique.sort();
    unique.dedup();
    assert_eq!(names.len(), 6);
    assert_eq!(unique.len(), 6);
    for name in names {
        assert!(query.to_sql().contains(&format!("@{}", name)));
    }
}

#[test]
fn test_failed_merge_reports_counts_and_changes_nothing() {
    let context = QueryContext::new();
    let orders = context.table::<()>("Orders").where_eq("Status", "open").into_builder();
    let broken = context
        .table::<()>("Customers")
        .where_raw("[Tier] = @tier")
        .declare_parameter("tier", sqlweave_query::DbType::Int)
        .unwrap();

    let err = orders.clone().union(&broken).unwrap_err();
    assert!(matches!(
        err,
        QueryError::SideTableMismatch { ref operation, parameters: 1, defaults: 0, values: 0 }
            if operation == "union"
    ));
    assert_eq!(
        err.to_string(),
        "union: side table mismatch (1 declared parameters, 0 defaults, 0 bound values)"
    );
    assert_eq!(orders.parameters().len(), 1);

    let fixed = broken.bind_value("tier", 2).unwrap();
    assert!(orders.union(&fixed).is_ok());
}

#[test]
fn test_raw_parameter_collision_is_rejected() {
    let context = QueryContext::new();
    let a = context
        .table::<()>("A")
        .where_raw("[X] = @x")
        .bind_value("x", 1)
        .unwrap();
    let b = context
        .table::<()>("B")
        .where_raw("[X] = @x")
        .bind_value("x", 2)
        .unwrap();

    let err = a.union(&b).unwrap_err();
    assert_eq!(
        err,
        QueryError::DuplicateParameter {
            operation: "union".to_string(),
            name: "x".to_string()
        }
    );
}

#[test]
fn test_composing_across_contexts_fails() {
    let a = QueryBuilder::<()>::new("A");
    let b = QueryBuilder::<()>::new("B");
    assert!(matches!(a.union(&b), Err(QueryError::ForeignContext { .. })));
}
