//! CLI parsing and end-to-end command runs against a temporary store

use clap::{CommandFactory, Parser};
use webpad::config::WebpadConfig;
use webpad::error::ApiError;
use webpad::tooling::cli::{Cli, CliContext, Commands, SettingsCommands};

#[test]
fn parse_valid_command_matrix() {
    let cases: Vec<Vec<&str>> = vec![
        vec!["webpad", "new", "Demo"],
        vec!["webpad", "new", "Demo", "--sample"],
        vec!["webpad", "list"],
        vec!["webpad", "show", "Demo"],
        vec!["webpad", "add-file", "Demo", "js/app.js"],
        vec!["webpad", "add-folder", "Demo", "js"],
        vec!["webpad", "write", "Demo", "js/app.js", "./app.js"],
        vec!["webpad", "rm", "Demo", "js"],
        vec!["webpad", "mv", "Demo", "app.js", "js"],
        vec!["webpad", "rename", "Demo", "app.js", "main.js"],
        vec!["webpad", "cat", "Demo", "index.html"],
        vec!["webpad", "preview", "Demo", "--out", "out.html"],
        vec!["webpad", "import", "project.json"],
        vec!["webpad", "export", "Demo"],
        vec!["webpad", "delete", "Demo"],
        vec!["webpad", "config"],
        vec!["webpad", "settings", "show"],
        vec!["webpad", "settings", "set", "tabWidth", "4"],
        vec!["webpad", "--log-format", "json", "--log-output", "stderr", "list"],
    ];

    for args in cases {
        let parsed = Cli::try_parse_from(args.clone());
        assert!(parsed.is_ok(), "failed to parse {:?}: {:?}", args, parsed.err());
    }
}

#[test]
fn parse_rejects_incomplete_commands() {
    let cases: Vec<Vec<&str>> = vec![
        vec!["webpad"],
        vec!["webpad", "new"],
        vec!["webpad", "mv", "Demo", "app.js"],
        vec!["webpad", "settings", "set", "tabWidth"],
        vec!["webpad", "frobnicate"],
    ];
    for args in cases {
        assert!(Cli::try_parse_from(args.clone()).is_err(), "parsed {:?}", args);
    }
}

#[test]
fn help_lists_every_subcommand() {
    let help = Cli::command().render_long_help().to_string();
    for name in [
        "new", "list", "show", "add-file", "add-folder", "write", "rm", "mv", "rename", "cat",
        "preview", "import", "export", "delete", "config", "settings",
    ] {
        assert!(help.contains(name), "help is missing {}", name);
    }
}

fn context(dir: &std::path::Path) -> CliContext {
    let mut config = WebpadConfig::default();
    config.storage.data_dir = Some(dir.join("db"));
    CliContext::new(config).unwrap()
}

fn run(ctx: &CliContext, args: &[&str]) -> String {
    let mut full = vec!["webpad"];
    full.extend_from_slice(args);
    let cli = Cli::try_parse_from(full).unwrap();
    ctx.execute(&cli.command).unwrap()
}

#[test]
fn editing_a_project_from_the_command_line() {
    let dir = tempfile::tempdir().unwrap();
    let ctx = context(dir.path());

    assert!(run(&ctx, &["list"]).contains("No projects yet"));
    assert!(run(&ctx, &["new", "Demo", "--sample"]).contains("Demo"));
    assert!(run(&ctx, &["list"]).contains("Demo"));

    run(&ctx, &["add-folder", "Demo", "js"]);
    let source = dir.path().join("app.js");
    std::fs::write(&source, "console.log('cli')").unwrap();
    run(&ctx, &["write", "Demo", "js/app.js", source.to_str().unwrap()]);
    assert_eq!(run(&ctx, &["cat", "Demo", "js/app.js"]), "console.log('cli')");

    run(&ctx, &["rename", "Demo", "js/app.js", "main.js"]);
    run(&ctx, &["mv", "Demo", "js/main.js", "/"]);
    let tree = run(&ctx, &["show", "Demo"]);
    assert!(tree.contains("main.js"));
    assert!(tree.contains("js"));

    let preview = dir.path().join("preview.html");
    run(&ctx, &["preview", "Demo", "--out", preview.to_str().unwrap()]);
    let document = std::fs::read_to_string(&preview).unwrap();
    assert!(document.contains("data-webpad-bridge"));

    let export = dir.path().join("demo.json");
    run(&ctx, &["export", "Demo", "--out", export.to_str().unwrap()]);
    run(&ctx, &["rm", "Demo", "main.js"]);
    assert!(ctx
        .execute(&Commands::Cat {
            project: "Demo".to_string(),
            path: "main.js".to_string()
        })
        .is_err());

    run(&ctx, &["delete", "Demo"]);
    assert!(run(&ctx, &["list"]).contains("No projects yet"));

    assert!(run(&ctx, &["import", export.to_str().unwrap()]).contains("Demo"));
    assert_eq!(run(&ctx, &["cat", "Demo", "main.js"]), "console.log('cli')");
}

#[test]
fn duplicate_names_require_an_id() {
    let dir = tempfile::tempdir().unwrap();
    let ctx = context(dir.path());
    run(&ctx, &["new", "Twin"]);
    let created = run(&ctx, &["new", "Twin"]);
    let id = created
        .rsplit('(')
        .next()
        .unwrap()
        .trim_end_matches(')')
        .to_string();

    let result = ctx.execute(&Commands::Show {
        project: "Twin".to_string(),
    });
    assert!(matches!(result, Err(ApiError::AmbiguousProject(name)) if name == "Twin"));
    assert!(run(&ctx, &["show", &id]).contains("index.html"));
}

#[test]
fn settings_persist_between_runs() {
    let dir = tempfile::tempdir().unwrap();
    {
        let ctx = context(dir.path());
        let shown = ctx
            .execute(&Commands::Settings {
                command: SettingsCommands::Set {
                    key: "tabWidth".to_string(),
                    value: "4".to_string(),
                },
            })
            .unwrap();
        assert!(shown.contains("\"tabWidth\": 4"));
    }
    let ctx = context(dir.path());
    assert!(run(&ctx, &["settings", "show"]).contains("\"tabWidth\": 4"));
    let rejected = ctx.execute(&Commands::Settings {
        command: SettingsCommands::Set {
            key: "fontSize".to_string(),
            value: "500".to_string(),
        },
    });
    assert!(rejected.is_err());
}
