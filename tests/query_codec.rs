use tunedesk::{
    entity::Resource,
    query::{self, FilterChange, FilterValue, ListQuery},
    util::date,
};

#[test]
fn filter_edit_resets_page_and_drops_default_limit() {
    let schema = Resource::Categories.filter_schema();
    let current = query::decode(schema, "?isActive=false&page=2");
    assert_eq!(current.page, 2);
    assert_eq!(current.filter["isActive"], FilterValue::Bool(false));

    let next = query::apply(
        &current,
        &FilterChange::new().set("isActive", FilterValue::Bool(true)),
    );
    assert_eq!(query::encode(&next), "isActive=true&page=1");
}

#[test]
fn decoded_locations_encode_stably() {
    let schema = Resource::Playlists.filter_schema();
    let raw = "used_to=2024-02-29T18:30:00Z&q=late+night&type=3&limit=50&page=4";

    let first = query::decode(schema, raw);
    let encoded = query::encode(&first);
    let second = query::decode(schema, &encoded);

    assert_eq!(first, second);
    assert_eq!(encoded, query::encode(&second));
    assert_eq!(
        first.filter["used_to"],
        FilterValue::Date(date::parse_day("2024-02-29").unwrap())
    );
    assert_eq!(first.filter["q"], FilterValue::Text("late night".into()));
}

#[test]
fn malformed_values_are_dropped_not_fatal() {
    let schema = Resource::Users.filter_schema();
    let query = query::decode(schema, "role=admin&page=-3&limit=0&created_from=yesterday&foo=bar");

    assert!(!query.filter.contains_key("role"));
    assert!(!query.filter.contains_key("created_from"));
    assert_eq!(query.filter["foo"], FilterValue::Text("bar".into()));
    assert_eq!((query.page, query.limit), (1, 10));
}

#[test]
fn reset_clears_everything() {
    let schema = Resource::Albums.filter_schema();
    assert_eq!(query::decode(schema, &query::reset()), ListQuery::default());
}

#[test]
fn request_params_always_carry_the_window() {
    let schema = Resource::Songs.filter_schema();
    let query = query::decode(schema, "isActive");
    let params = query::to_request_params(&query);

    assert_eq!(
        params,
        vec![
            ("isActive".to_string(), "true".to_string()),
            ("page".to_string(), "1".to_string()),
            ("limit".to_string(), "10".to_string()),
        ]
    );
}
