use elif_routing::{
    handler_fn, Dispatch, Precedence, RouteValues, RouterOptions, TreeRouteBuilder, TreeRouter,
    VirtualPathContext,
};

fn values(pairs: &[(&str, &str)]) -> RouteValues {
    pairs.iter().copied().collect()
}

fn outbound_router(templates: &[&str]) -> TreeRouter {
    let mut builder = TreeRouteBuilder::new();
    for template in templates {
        builder.map_outbound(template, RouteValues::new(), None, 0).unwrap();
    }
    builder.build().unwrap()
}

fn generate(
    router: &TreeRouter,
    explicit: &[(&str, &str)],
    ambient: &[(&str, &str)],
) -> Option<String> {
    let context = VirtualPathContext::new(values(explicit), values(ambient));
    router.generate_virtual_path(&context).map(|data| data.path)
}

fn generate_named(router: &TreeRouter, name: &str, ambient: &[(&str, &str)]) -> Option<String> {
    let context =
        VirtualPathContext::new(RouteValues::new(), values(ambient)).with_route_name(name);
    router.generate_virtual_path(&context).map(|data| data.path)
}

fn area_router() -> TreeRouter {
    let mut builder = TreeRouteBuilder::new();
    builder
        .map_outbound(
            "Help/Store",
            values(&[("area", "Help"), ("action", "Edit"), ("controller", "Store")]),
            None,
            0,
        )
        .unwrap()
        .with_precedence(Precedence::from_digits(vec![2]));
    builder
        .map_outbound(
            "Store",
            values(&[("area", ""), ("action", "Edit"), ("controller", "Store")]),
            None,
            0,
        )
        .unwrap()
        .with_precedence(Precedence::from_digits(vec![1]));
    builder.build().unwrap()
}

#[test]
fn test_generate_link_prefers_more_specific_template() {
    let cases = [
        ("template", "{*url:alpha}", "/template?url=dingo&id=5"),
        ("{id:alpha}/{url}", "{id}", "/5?url=dingo"),
        ("{id}", "{*url}", "/5?url=dingo"),
        ("{id:int}", "{id}", "/5?url=dingo"),
        ("template/api{id}location", "template/{id:int}", "/template/api5location?url=dingo"),
        ("template/api/{*url}", "template/api", "/template/api/dingo?id=5"),
    ];

    for (first, second, expected) in cases {
        let router = outbound_router(&[second, first]);
        let path = generate(&router, &[("url", "dingo"), ("id", "5")], &[]);
        assert_eq!(path.as_deref(), Some(expected), "{} vs {}", first, second);
    }
}

#[test]
fn test_generate_link_leaves_out_trailing_default() {
    let router = outbound_router(&["template", "template/{parameter:int=1003}"]);
    assert_eq!(generate(&router, &[], &[]).as_deref(), Some("/template"));
}

#[test]
fn test_generate_link_uses_ambient_values() {
    let ambient = [("parameter", "5"), ("id", "1234")];

    let router = outbound_router(&["template", "template/{parameter}"]);
    assert_eq!(generate(&router, &[], &ambient).as_deref(), Some("/template/5"));

    let router = outbound_router(&["template/{parameter}", "template/{parameter}/{id}"]);
    assert_eq!(generate(&router, &[], &ambient).as_deref(), Some("/template/5/1234"));

    let router = outbound_router(&["template/{parameter:int=5}", "template"]);
    assert_eq!(generate(&router, &[], &[("parameter", "7")]).as_deref(), Some("/template/7"));
}

#[test]
fn test_generate_link_respects_precedence() {
    let cases = [
        ("template/5", "template/{parameter:int}"),
        ("template/5", "template/{parameter}"),
        ("template/5", "template/{*parameter:int}"),
        ("template/5", "template/{*parameter}"),
        ("template/{parameter:int}", "template/{parameter}"),
        ("template/{parameter:int}", "template/{*parameter}"),
        ("template/{parameter}", "template/{*parameter}"),
        ("template/{*parameter:int}", "template/{*parameter}"),
    ];

    for (first, second) in cases {
        let router = outbound_router(&[second, first]);
        let path = generate(&router, &[], &[("parameter", "5")]);
        assert_eq!(path.as_deref(), Some("/template/5"), "{} vs {}", first, second);
    }
}

#[test]
fn test_generate_link_respects_order_over_precedence() {
    let mut builder = TreeRouteBuilder::new();
    builder.map_outbound("template/5", RouteValues::new(), None, 1).unwrap();
    builder.map_outbound("template/{first}", RouteValues::new(), None, 0).unwrap();
    let router = builder.build().unwrap();

    assert_eq!(generate(&router, &[], &[("first", "7")]).as_deref(), Some("/template/7"));
}

#[test]
fn test_generate_link_is_stable_for_equal_entries() {
    let router = outbound_router(&["second/{second}", "first/{first}"]);
    let path = generate(&router, &[], &[("first", "5"), ("second", "5")]);
    assert_eq!(path.as_deref(), Some("/first/5"));
}

#[test]
fn test_generate_link_with_optional_inline_parameter() {
    let router = outbound_router(&["template/{parameter:int?}"]);
    assert_eq!(generate(&router, &[], &[]).as_deref(), Some("/template"));
    assert_eq!(generate(&router, &[], &[("parameter", "5")]).as_deref(), Some("/template/5"));
    assert_eq!(generate(&router, &[], &[("parameter", "asdf")]), None);

    let router = outbound_router(&["template/{parameter:range(1,20)?}"]);
    assert_eq!(generate(&router, &[], &[("parameter", "21")]), None);
}

#[test]
fn test_generate_link_writes_intermediate_default() {
    let router = outbound_router(&["a/b/{parameter3=3}/d"]);
    assert_eq!(generate(&router, &[], &[]).as_deref(), Some("/a/b/3/d"));
}

#[test]
fn test_generate_link_with_name() {
    let mut builder = TreeRouteBuilder::new();
    // lower priority than the unnamed route so that only the name can select it
    builder.map_outbound("named", RouteValues::new(), Some("NamedRoute"), 1).unwrap();
    builder.map_outbound("unnamed", RouteValues::new(), None, 0).unwrap();
    let router = builder.build().unwrap();

    let context = VirtualPathContext::default().with_route_name("NamedRoute");
    let data = router.generate_virtual_path(&context).unwrap();
    assert_eq!(data.path, "/named");
    assert_eq!(data.route_name.as_deref(), Some("NamedRoute"));
    assert!(data.data_tokens.is_empty());

    assert_eq!(generate_named(&router, "namedroute", &[]).as_deref(), Some("/named"));
    assert_eq!(generate_named(&router, "NonExistingNamedRoute", &[]), None);
}

#[test]
fn test_named_generation_does_not_fall_back_to_other_routes() {
    let cases = [
        ("template/{parameter:int}", None),
        ("template/{parameter:int}", Some("NaN")),
        ("template/{parameter}", None),
        ("template/{*parameter:int}", None),
        ("template/{*parameter:int}", Some("NaN")),
    ];

    for (template, value) in cases {
        let mut builder = TreeRouteBuilder::new();
        builder.map_outbound(template, RouteValues::new(), Some("NamedRoute"), 1).unwrap();
        builder.map_outbound("unnamed", RouteValues::new(), None, 0).unwrap();
        let router = builder.build().unwrap();

        let ambient: Vec<(&str, &str)> =
            value.map(|value| ("parameter", value)).into_iter().collect();
        assert_eq!(
            generate_named(&router, "NamedRoute", &ambient),
            None,
            "{} with {:?}",
            template,
            value
        );
    }
}

#[test]
fn test_named_generation_with_matching_values() {
    for template in [
        "template/{parameter:int}",
        "template/{parameter}",
        "template/{*parameter:int}",
        "template/{*parameter}",
    ] {
        let mut builder = TreeRouteBuilder::new();
        builder.map_outbound(template, RouteValues::new(), Some("NamedRoute"), 1).unwrap();
        builder.map_outbound("unnamed", RouteValues::new(), None, 0).unwrap();
        let router = builder.build().unwrap();

        let path = generate_named(&router, "NamedRoute", &[("parameter", "5")]);
        assert_eq!(path.as_deref(), Some("/template/5"), "{}", template);
    }
}

#[test]
fn test_generate_link_selected_by_required_values() {
    let mut builder = TreeRouteBuilder::new();
    builder.map_outbound("api/Store", RouteValues::new(), None, 0).unwrap();
    let router = builder.build().unwrap();
    assert_eq!(generate(&router, &[], &[]).as_deref(), Some("/api/Store"));

    let store = [("action", "Index"), ("controller", "Store")];
    let mut builder = TreeRouteBuilder::new();
    builder.map_outbound("api/Store", values(&store), None, 0).unwrap();
    let router = builder.build().unwrap();

    assert_eq!(generate(&router, &store, &[]).as_deref(), Some("/api/Store"));
    assert_eq!(generate(&router, &[], &store).as_deref(), Some("/api/Store"));
    assert_eq!(
        generate(&router, &[("action", "Index")], &[("controller", "Store")]).as_deref(),
        Some("/api/Store")
    );
    assert_eq!(
        generate(&router, &[("action", "Index"), ("id", "5")], &[("controller", "Store")])
            .as_deref(),
        Some("/api/Store?id=5")
    );
    assert_eq!(generate(&router, &[("action", "Details"), ("controller", "Store")], &[]), None);
}

#[test]
fn test_generate_link_with_parameters_named_by_required_values() {
    let store = [("action", "Index"), ("controller", "Store")];

    let mut builder = TreeRouteBuilder::new();
    builder.map_outbound("api/Store/{action}", values(&store), None, 0).unwrap();
    let router = builder.build().unwrap();
    assert_eq!(generate(&router, &store, &[]).as_deref(), Some("/api/Store/Index"));

    let mut builder = TreeRouteBuilder::new();
    builder.map_outbound("api/Store/{action=Index}", values(&store), None, 0).unwrap();
    let router = builder.build().unwrap();
    assert_eq!(generate(&router, &store, &[]).as_deref(), Some("/api/Store"));

    let mut builder = TreeRouteBuilder::new();
    builder
        .map_outbound(
            "api/{area}/dosomething/{controller}/{action}",
            values(&[("action", "Index"), ("controller", "Store"), ("area", "AwesomeCo")]),
            None,
            0,
        )
        .unwrap();
    let router = builder.build().unwrap();
    assert_eq!(
        generate(&router, &store, &[("area", "AwesomeCo")]).as_deref(),
        Some("/api/AwesomeCo/dosomething/Store/Index")
    );
}

#[test]
fn test_generate_link_checks_constraints() {
    let mut builder = TreeRouteBuilder::new();
    builder
        .map_outbound(
            "api/Store/{action}/{id:int}",
            values(&[("action", "Index"), ("controller", "Store")]),
            None,
            0,
        )
        .unwrap();
    let router = builder.build().unwrap();

    let path = generate(&router, &[("action", "Index"), ("controller", "Store"), ("id", "5")], &[]);
    assert_eq!(path.as_deref(), Some("/api/Store/Index/5"));

    let explicit = [("action", "Index"), ("controller", "Store"), ("id", "heyyyy")];
    let path = generate(&router, &explicit, &[]);
    assert_eq!(path, None);
}

#[test]
fn test_generate_link_ignores_ambient_values_when_required_value_changes() {
    let page = [("page", "/Customers/SeparatePageModels/Index")];
    let mut builder = TreeRouteBuilder::new();
    builder
        .map_outbound("Customers/SeparatePageModels/{handler?}/{id?}", values(&page), None, 0)
        .unwrap();
    let router = builder.build().unwrap();

    let path = generate(
        &router,
        &page,
        &[("page", "/Customers/SeparatePageModels/Edit"), ("id", "17")],
    );
    assert_eq!(path.as_deref(), Some("/Customers/SeparatePageModels"));
}

#[test]
fn test_generate_link_falls_through_to_next_route() {
    let mut builder = TreeRouteBuilder::new();
    builder
        .map_outbound("api/Store", values(&[("action", "Index"), ("controller", "Store")]), None, 0)
        .unwrap();
    builder
        .map_outbound(
            "api2/{controller}",
            values(&[("action", "Index"), ("controller", "Blog")]),
            None,
            0,
        )
        .unwrap();
    let router = builder.build().unwrap();

    let path = generate(&router, &[("action", "Index"), ("controller", "Blog")], &[]);
    assert_eq!(path.as_deref(), Some("/api2/Blog"));
}

#[test]
fn test_generate_link_to_area() {
    let router = area_router();
    let explicit = [("area", "Help"), ("action", "Edit"), ("controller", "Store")];
    let path = generate(&router, &explicit, &[]);
    assert_eq!(path.as_deref(), Some("/Help/Store"));

    let path =
        generate(&router, &[("action", "Edit"), ("controller", "Store")], &[("area", "Help")]);
    assert_eq!(path.as_deref(), Some("/Help/Store"));
}

#[test]
fn test_generate_link_to_area_with_reversed_precedence() {
    let mut builder = TreeRouteBuilder::new();
    builder
        .map_outbound(
            "Help/Store",
            values(&[("area", "Help"), ("action", "Edit"), ("controller", "Store")]),
            None,
            0,
        )
        .unwrap()
        .with_precedence(Precedence::from_digits(vec![1]));
    builder
        .map_outbound(
            "Store",
            values(&[("area", ""), ("action", "Edit"), ("controller", "Store")]),
            None,
            0,
        )
        .unwrap()
        .with_precedence(Precedence::from_digits(vec![2]));
    let router = builder.build().unwrap();

    let explicit = [("area", "Help"), ("action", "Edit"), ("controller", "Store")];
    let path = generate(&router, &explicit, &[]);
    assert_eq!(path.as_deref(), Some("/Help/Store"));
}

#[test]
fn test_generate_link_out_of_area_ignores_ambient_area() {
    let router = area_router();
    let path =
        generate(&router, &[("action", "Edit"), ("controller", "Store")], &[("area", "Blog")]);
    assert_eq!(path.as_deref(), Some("/Store"));
}

#[test]
fn test_empty_required_value_matches_missing_or_empty_value() {
    let mut builder = TreeRouteBuilder::new();
    builder
        .map_outbound(
            "Help/Store",
            values(&[("area", ""), ("action", "Edit"), ("controller", "Store")]),
            None,
            0,
        )
        .unwrap();
    let router = builder.build().unwrap();

    let path = generate(&router, &[("area", ""), ("action", "Edit"), ("controller", "Store")], &[]);
    assert_eq!(path.as_deref(), Some("/Help/Store"));

    let path = generate(&router, &[("action", "Edit"), ("controller", "Store")], &[]);
    assert_eq!(path.as_deref(), Some("/Help/Store"));
}

#[test]
fn test_generate_link_with_optional_parameters() {
    let cases: [(&str, &[(&str, &str)], &[(&str, &str)], &str); 8] = [
        (
            "Test/{val1}/{val2}.{val3?}",
            &[("val1", "someval1"), ("val2", "someval2"), ("val3", "someval3a")],
            &[("val3", "someval3v")],
            "/Test/someval1/someval2.someval3v",
        ),
        (
            "Test/{val1}/{val2}.{val3?}",
            &[("val3", "someval3a")],
            &[("val1", "someval1"), ("val2", "someval2"), ("val3", "someval3v")],
            "/Test/someval1/someval2.someval3v",
        ),
        (
            "Test/{val1}/{val2}.{val3?}",
            &[],
            &[("val1", "someval1"), ("val2", "someval2")],
            "/Test/someval1/someval2",
        ),
        (
            "Test/{val1}.{val2}.{val3}.{val4?}",
            &[("val1", "someval1"), ("val2", "someval2")],
            &[("val4", "someval4"), ("val3", "someval3")],
            "/Test/someval1.someval2.someval3.someval4",
        ),
        (
            "Test/{val1}.{val2}.{val3}.{val4?}",
            &[("val1", "someval1"), ("val2", "someval2")],
            &[("val3", "someval3")],
            "/Test/someval1.someval2.someval3",
        ),
        ("Test/.{val2?}", &[], &[("val2", "someval2")], "/Test/.someval2"),
        ("Test/.{val2?}", &[], &[], "/Test/"),
        (
            "Test/{val1}.{val2}",
            &[("val1", "someval1"), ("val2", "someval2")],
            &[("val3", "someval3")],
            "/Test/someval1.someval2?val3=someval3",
        ),
    ];

    for (template, ambient, explicit, expected) in cases {
        let router = outbound_router(&[template]);
        assert_eq!(generate(&router, explicit, ambient).as_deref(), Some(expected), "{}", template);
    }
}

#[test]
fn test_generated_link_carries_data_tokens_and_name() {
    let mut builder = TreeRouteBuilder::new();
    builder
        .map_outbound(
            "admin/{controller}",
            values(&[("area", "admin")]),
            Some("admin_pages"),
            0,
        )
        .unwrap()
        .with_data_token("layout", "admin");
    let router = builder.build().unwrap();

    let explicit = values(&[("area", "admin"), ("controller", "Users")]);
    let context = VirtualPathContext::new(explicit, RouteValues::new());
    let data = router.generate_virtual_path(&context).unwrap();
    assert_eq!(data.path, "/admin/Users");
    assert_eq!(data.route_name.as_deref(), Some("admin_pages"));
    assert_eq!(data.data_tokens.get("layout"), Some("admin"));
}

#[test]
fn test_router_options_shape_generated_links() {
    let options = RouterOptions {
        lowercase_urls: true,
        append_trailing_slash: true,
        ..RouterOptions::default()
    };
    let mut builder = TreeRouteBuilder::new().with_options(options);
    builder.map_outbound("Api/{controller}", RouteValues::new(), None, 0).unwrap();
    let router = builder.build().unwrap();

    let path = generate(&router, &[("controller", "Products"), ("Sort", "Desc")], &[]);
    assert_eq!(path.as_deref(), Some("/api/products/?Sort=Desc"));
}

#[test]
fn test_generated_link_matches_back_to_the_same_values() {
    let mut builder = TreeRouteBuilder::new();
    builder
        .map_inbound(handler_fn(|_| Dispatch::Handled), "products/{cat}/{id}", None, 0)
        .unwrap();
    builder
        .map_outbound("products/{cat}/{id}", RouteValues::new(), None, 0)
        .unwrap();
    let router = builder.build().unwrap();

    let values = values(&[("cat", "toys"), ("id", "42")]);
    let context = VirtualPathContext::new(values.clone(), RouteValues::new());
    let path = router.generate_virtual_path(&context).unwrap().path;
    assert_eq!(path, "/products/toys/42");

    let found = router.match_path(&path, &RouteValues::new()).unwrap();
    assert_eq!(found.values, values);
}
