//! End-to-end resolution coverage: layer precedence, registration
//! visibility, event dispatch, and serialisation of the merged result.

use std::sync::{Arc, Mutex};

use anyhow::{Context, Result, anyhow, ensure};
use rstest::rstest;
use serde_json::json;
use strata_config::{
    ConfigError, ConfigResolver, FnSource, StaticSource, UserConfig, Value,
};

struct PrecedenceCase {
    project: &'static str,
    store_formats: Option<&'static str>,
    override_prefix: Option<&'static str>,
    expected_prefix: &'static str,
    expected_formats: &'static [&'static str],
}

#[rstest]
#[case::defaults_when_nothing_declares(PrecedenceCase {
    project: "",
    store_formats: None,
    override_prefix: None,
    expected_prefix: "/",
    expected_formats: &["liquid", "md", "tera", "hbs", "html"],
})]
#[case::project_file_overrides_defaults(PrecedenceCase {
    project: "path_prefix = \"/docs/\"\ntemplate_formats = [\"md\"]\n",
    store_formats: None,
    override_prefix: None,
    expected_prefix: "/docs/",
    expected_formats: &["md"],
})]
#[case::store_declarations_override_the_project_file(PrecedenceCase {
    project: "path_prefix = \"/docs/\"\ntemplate_formats = [\"md\"]\n",
    store_formats: Some("njk, html"),
    override_prefix: None,
    expected_prefix: "/docs/",
    expected_formats: &["njk", "html"],
})]
#[case::comma_separated_formats_split_and_trim(PrecedenceCase {
    project: "",
    store_formats: Some("html, njk , md"),
    override_prefix: None,
    expected_prefix: "/",
    expected_formats: &["html", "njk", "md"],
})]
#[case::runtime_overrides_apply_last(PrecedenceCase {
    project: "path_prefix = \"/docs/\"\n",
    store_formats: Some("md"),
    override_prefix: Some("/forced/"),
    expected_prefix: "/forced/",
    expected_formats: &["md"],
})]
fn precedence_follows_the_layer_order(#[case] case: PrecedenceCase) -> Result<()> {
    let PrecedenceCase {
        project,
        store_formats,
        override_prefix,
        expected_prefix,
        expected_formats,
    } = case;
    let mut resolver = ConfigResolver::builder()
        .source(FnSource::new(move |api: &mut UserConfig| {
            if let Some(declared) = store_formats {
                api.set_template_formats(declared);
            }
            let parsed: toml::Value = toml::from_str(project)
                .map_err(|error| ConfigError::source_error("inline.toml", error))?;
            Ok(Value::from(parsed))
        }))
        .build()
        .context("build resolver")?;
    if let Some(prefix) = override_prefix {
        resolver.set_path_prefix(prefix);
    }

    let config = resolver.config();
    ensure!(
        config.path_prefix() == expected_prefix,
        "expected prefix {:?}, got {:?}",
        expected_prefix,
        config.path_prefix()
    );
    ensure!(
        config.template_formats() == expected_formats,
        "expected formats {:?}, got {:?}",
        expected_formats,
        config.template_formats()
    );
    Ok(())
}

#[rstest]
fn registrations_surface_in_the_resolved_config() -> Result<()> {
    let resolver = ConfigResolver::builder()
        .source(FnSource::new(|api: &mut UserConfig| {
            api.add_filter("shout", |args| Ok(args.first().cloned().unwrap_or_default()));
            api.add_liquid_tag("youtube", |args| Ok(args.first().cloned().unwrap_or_default()));
            api.add_layout_alias("post", "layouts/post.liquid");
            api.add_passthrough_copy("assets/img");
            api.set_markdown_options(Value::from(json!({"smartypants": true})));
            Ok(Value::from(json!({})))
        }))
        .build()?;

    let config = resolver.config();
    ensure!(config.liquid_filters().contains_key("shout"));
    ensure!(config.tera_filters().contains_key("shout"));
    ensure!(config.handlebars_helpers().contains_key("shout"));
    ensure!(config.liquid_tags().contains_key("youtube"));
    ensure!(
        config.layout_aliases().get("post").and_then(Value::as_str)
            == Some("layouts/post.liquid")
    );
    ensure!(
        config
            .passthrough_copies()
            .get("assets/img")
            .and_then(Value::as_bool)
            == Some(true)
    );
    ensure!(
        config
            .markdown_options()
            .as_map()
            .and_then(|options| options.get("smartypants"))
            .and_then(Value::as_bool)
            == Some(true)
    );
    Ok(())
}

#[rstest]
fn transforms_share_the_legacy_filters_key_with_project_data() -> Result<()> {
    let resolver = ConfigResolver::builder()
        .source(FnSource::new(|api: &mut UserConfig| {
            api.add_transform("minify", |args| Ok(args.first().cloned().unwrap_or_default()));
            Ok(Value::from(json!({"filters": {"from_project": "keep"}})))
        }))
        .build()?;

    let config = resolver.config();
    let filters = config.get("filters").and_then(Value::as_map);
    ensure!(
        filters.is_some_and(|map| map.contains_key("minify")),
        "registered transform missing from the filters key"
    );
    ensure!(
        filters
            .and_then(|map| map.get("from_project"))
            .and_then(Value::as_str)
            == Some("keep"),
        "project data under the filters key was lost"
    );
    ensure!(
        config.transforms().contains_key("minify"),
        "transforms accessor does not read the filters key"
    );
    Ok(())
}

#[rstest]
fn library_overrides_round_trip_through_resolution() -> Result<()> {
    struct EngineStub {
        name: &'static str,
    }

    let resolver = ConfigResolver::builder()
        .source(FnSource::new(|api: &mut UserConfig| {
            api.set_library("Tera", EngineStub { name: "custom tera" });
            Ok(Value::from(json!({})))
        }))
        .build()?;

    let config = resolver.config();
    let engine = config
        .library_overrides()
        .get("tera")
        .and_then(Value::as_handler)
        .and_then(strata_config::Handler::downcast_instance::<EngineStub>);
    ensure!(
        engine.map(|stub| stub.name) == Some("custom tera"),
        "library override lost its instance"
    );
    Ok(())
}

#[rstest]
fn listeners_registered_during_load_receive_later_events() -> Result<()> {
    let seen = Arc::new(Mutex::new(Vec::new()));
    let sink = Arc::clone(&seen);
    let mut resolver = ConfigResolver::builder()
        .source(FnSource::new(move |api: &mut UserConfig| {
            let log = Arc::clone(&sink);
            api.on("build.before", move |args| {
                if let Ok(mut entries) = log.lock() {
                    entries.extend(args.iter().filter_map(Value::as_integer));
                }
                Ok(())
            });
            Ok(Value::from(json!({})))
        }))
        .build()?;

    resolver
        .user_config_mut()
        .emit("build.before", &[Value::Integer(41), Value::Integer(1)])?;
    let Ok(recorded) = seen.lock() else {
        return Err(anyhow!("listener log poisoned"));
    };
    ensure!(*recorded == [41, 1], "unexpected listener log: {recorded:?}");
    Ok(())
}

#[rstest]
fn listener_failures_surface_as_listener_errors() -> Result<()> {
    let mut resolver = ConfigResolver::builder()
        .source(StaticSource::absent())
        .build()?;
    resolver
        .user_config_mut()
        .on("build.after", |_args| Err("disk full".into()));

    let failure = resolver.user_config_mut().emit("build.after", &[]);
    ensure!(
        matches!(failure, Err(ConfigError::Listener { ref event, .. }) if event == "build.after"),
        "expected a listener error, got {failure:?}"
    );
    Ok(())
}

#[test]
fn version_gates_fail_the_build() {
    let failure = ConfigResolver::builder()
        .source(FnSource::new(|api: &mut UserConfig| {
            api.version_check(">=99.0.0")?;
            Ok(Value::from(json!({})))
        }))
        .build();

    assert!(matches!(failure, Err(ConfigError::VersionMismatch { .. })));
}

#[rstest]
fn resolved_configs_serialise_with_handler_placeholders() -> Result<()> {
    let resolver = ConfigResolver::builder()
        .source(FnSource::new(|api: &mut UserConfig| {
            api.add_liquid_filter("shout", |args| {
                Ok(args.first().cloned().unwrap_or_default())
            });
            Ok(Value::from(json!({})))
        }))
        .build()?;

    let dumped = serde_json::to_string(resolver.config().as_ref()).context("serialise config")?;
    ensure!(
        dumped.contains(r#""shout":"<handler>""#),
        "handler placeholder missing from {dumped}"
    );
    Ok(())
}
