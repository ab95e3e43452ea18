use anyhow::{bail, Context};
use clap::{value_parser, Arg, ArgAction, ArgMatches, Command};
use cutboard_access::{CustomRoleRequest, Permission, PermissionSet, RoleKey, RoleKind};
use cutboard_core::{BoardFilter, Session, TrackerConfig};
use cutboard_model::{Priority, Project, ProjectDraft, ProjectId, ProjectPatch, Stage};
use cutboard_store::{FileStorage, ImportBundle, ListKind, Transition};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

const DEFAULT_DATA_DIR: &str = "./cutboard-data";

fn id_arg() -> Arg {
    Arg::new("id").required(true).help("Project id")
}

fn text_arg(name: &'static str, help: &'static str) -> Arg {
    Arg::new(name).long(name).help(help)
}

fn list_args() -> [Arg; 2] {
    [
        Arg::new("kind")
            .required(true)
            .value_parser(value_parser!(ListKind))
            .help("editor | platform | channel"),
        Arg::new("value").required(true).help("Entry"),
    ]
}

fn cli() -> Command {
    Command::new("cutboard")
        .version(cutboard_core::VERSION)
        .about("Kanban tracker for video-editing projects")
        .subcommand_required(true)
        .arg(
            Arg::new("data-dir")
                .long("data-dir")
                .global(true)
                .value_parser(value_parser!(PathBuf))
                .help("Directory holding the board files"),
        )
        .arg(
            Arg::new("config")
                .long("config")
                .global(true)
                .value_parser(value_parser!(PathBuf))
                .help("TOML configuration file"),
        )
        .arg(
            Arg::new("password")
                .long("password")
                .short('p')
                .global(true)
                .help("Login password"),
        )
        .subcommand(
            Command::new("board")
                .about("Show the board")
                .arg(text_arg("search", "Match title or client"))
                .arg(text_arg("editor", "Only this editor"))
                .arg(text_arg("platform", "Only this platform"))
                .arg(text_arg("channel", "Only this channel")),
        )
        .subcommand(Command::new("show").about("Show one project").arg(id_arg()))
        .subcommand(
            Command::new("create")
                .about("Create a project")
                .arg(Arg::new("title").required(true).help("Project title"))
                .arg(text_arg("client", "Client name"))
                .arg(text_arg("editor", "Assigned editor"))
                .arg(text_arg("platform", "Target platform"))
                .arg(text_arg("channel", "Channel"))
                .arg(text_arg("due", "Due date"))
                .arg(text_arg("stage", "Initial stage").value_parser(value_parser!(Stage)))
                .arg(text_arg("priority", "LOW | MEDIUM | HIGH").value_parser(value_parser!(Priority))),
        )
        .subcommand(
            Command::new("update")
                .about("Change project fields")
                .arg(id_arg())
                .arg(text_arg("title", "Project title"))
                .arg(text_arg("client", "Client name"))
                .arg(text_arg("editor", "Assigned editor"))
                .arg(text_arg("platform", "Target platform"))
                .arg(text_arg("channel", "Channel"))
                .arg(text_arg("notes", "Notes"))
                .arg(text_arg("priority", "LOW | MEDIUM | HIGH").value_parser(value_parser!(Priority))),
        )
        .subcommand(
            Command::new("move")
                .about("Move a project to a stage")
                .arg(id_arg())
                .arg(Arg::new("stage").required(true).value_parser(value_parser!(Stage))),
        )
        .subcommand(Command::new("complete").about("Move a project to Posted").arg(id_arg()))
        .subcommand(Command::new("delete").about("Move a project to the trash").arg(id_arg()))
        .subcommand(Command::new("duplicate").about("Copy a project").arg(id_arg()))
        .subcommand(Command::new("trash").about("List the trash"))
        .subcommand(Command::new("restore").about("Restore a trash entry").arg(id_arg()))
        .subcommand(Command::new("purge").about("Delete a trash entry for good").arg(id_arg()))
        .subcommand(Command::new("empty-trash").about("Delete every trash entry"))
        .subcommand(Command::new("stats").about("Show board statistics"))
        .subcommand(Command::new("lists").about("Show pick-lists"))
        .subcommand(Command::new("list-add").about("Add a pick-list entry").args(list_args()))
        .subcommand(Command::new("list-remove").about("Remove a pick-list entry").args(list_args()))
        .subcommand(Command::new("roles").about("List roles"))
        .subcommand(
            Command::new("role-create")
                .about("Create a custom role")
                .arg(Arg::new("name").required(true).help("Role name"))
                .arg(Arg::new("role-password").long("role-password").required(true).help("Password for the new role"))
                .arg(
                    Arg::new("permissions")
                        .long("permissions")
                        .value_delimiter(',')
                        .value_parser(value_parser!(Permission))
                        .help("Comma-separated permissions"),
                )
                .arg(Arg::new("channels").long("channels").value_delimiter(',').help("Comma-separated channels"))
                .arg(Arg::new("platforms").long("platforms").value_delimiter(',').help("Comma-separated platforms"))
                .arg(Arg::new("editors").long("editors").value_delimiter(',').help("Comma-separated editors"))
                .arg(Arg::new("view-only").long("view-only").action(ArgAction::SetTrue)),
        )
        .subcommand(
            Command::new("role-delete")
                .about("Delete a custom role")
                .arg(Arg::new("key").required(true)),
        )
        .subcommand(
            Command::new("export")
                .about("Export the board as JSON")
                .arg(Arg::new("out").long("out").value_parser(value_parser!(PathBuf)).help("Output file")),
        )
        .subcommand(
            Command::new("import")
                .about("Replace the board with an export file")
                .arg(Arg::new("file").required(true).value_parser(value_parser!(PathBuf)))
                .arg(
                    Arg::new("yes")
                        .long("yes")
                        .action(ArgAction::SetTrue)
                        .help("Confirm replacing all current data"),
                ),
        )
}

fn strings(args: &ArgMatches, name: &str) -> Vec<String> {
    args.get_many::<String>(name)
        .map(|values| values.map(|v| v.trim().to_string()).filter(|v| !v.is_empty()).collect())
        .unwrap_or_default()
}

fn text(args: &ArgMatches, name: &str) -> Option<String> {
    args.get_one::<String>(name).cloned()
}

fn project_id(args: &ArgMatches) -> ProjectId {
    ProjectId::new(text(args, "id").unwrap_or_default())
}

fn or_dash(value: &str) -> &str {
    if value.is_empty() {
        "-"
    } else {
        value
    }
}

fn print_card(project: &Project) {
    let done = project.checklist_done();
    let total = project.checklist.len();
    println!(
        "  {}  {} [{}] {} / {} / {} / {}  ({done}/{total})",
        project.id,
        project.title,
        project.priority,
        or_dash(&project.client),
        or_dash(&project.editor),
        or_dash(&project.platform),
        or_dash(&project.channel),
    );
}

fn print_detail(project: &Project) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(project)?);
    Ok(())
}

fn load_config(matches: &ArgMatches) -> anyhow::Result<TrackerConfig> {
    let mut config = match matches.get_one::<PathBuf>("config") {
        Some(path) => TrackerConfig::from_file(path)?,
        None => TrackerConfig::default(),
    };
    if let Some(dir) = matches.get_one::<PathBuf>("data-dir") {
        config = config.with_data_dir(dir.clone());
    }
    Ok(config)
}

fn run(matches: &ArgMatches) -> anyhow::Result<()> {
    let config = load_config(matches)?;
    let dir = config
        .data_dir
        .clone()
        .unwrap_or_else(|| PathBuf::from(DEFAULT_DATA_DIR));
    let mut session = Session::open(config, FileStorage::new(dir));

    let Some(password) = matches.get_one::<String>("password") else {
        bail!("a password is required (--password)");
    };
    let identity = session.login(password)?;
    tracing::debug!(role = %identity.role, "Session started");

    let result = dispatch(&mut session, matches);
    session.logout();
    for warning in session.drain_warnings() {
        eprintln!("warning: {warning}");
    }
    result
}

fn dispatch(session: &mut Session<FileStorage>, matches: &ArgMatches) -> anyhow::Result<()> {
    match matches.subcommand() {
        Some(("board", args)) => {
            let filter = BoardFilter {
                search: text(args, "search").unwrap_or_default(),
                editor: text(args, "editor").unwrap_or_default(),
                platform: text(args, "platform").unwrap_or_default(),
                channel: text(args, "channel").unwrap_or_default(),
            };
            let board = session.board(&filter)?;
            for column in &board.columns {
                println!("{} ({})", column.stage.name, column.projects.len());
                for project in &column.projects {
                    print_card(project);
                }
            }
        }
        Some(("show", args)) => print_detail(session.project(&project_id(args))?)?,
        Some(("create", args)) => {
            let mut draft = ProjectDraft::new(text(args, "title").unwrap_or_default())
                .with_client(text(args, "client").unwrap_or_default())
                .with_editor(text(args, "editor").unwrap_or_default())
                .with_platform(text(args, "platform").unwrap_or_default())
                .with_channel(text(args, "channel").unwrap_or_default());
            draft.due = text(args, "due").unwrap_or_default();
            if let Some(stage) = args.get_one::<Stage>("stage") {
                draft = draft.with_stage(*stage);
            }
            if let Some(priority) = args.get_one::<Priority>("priority") {
                draft = draft.with_priority(*priority);
            }
            let project = session.create(draft)?;
            println!("Created {}", project.id);
        }
        Some(("update", args)) => {
            let patch = ProjectPatch {
                title: text(args, "title"),
                client: text(args, "client"),
                editor: text(args, "editor"),
                platform: text(args, "platform"),
                channel: text(args, "channel"),
                notes: text(args, "notes"),
                priority: args.get_one::<Priority>("priority").copied(),
                ..ProjectPatch::new()
            };
            let project = session.update(&project_id(args), patch)?;
            println!("Updated {}", project.id);
        }
        Some(("move", args)) => {
            let stage = args.get_one::<Stage>("stage").copied().unwrap_or_default();
            report_transition(session.move_stage(&project_id(args), stage)?);
        }
        Some(("complete", args)) => report_transition(session.quick_complete(&project_id(args))?),
        Some(("delete", args)) => {
            session.delete(&project_id(args))?;
            println!("Moved to trash");
        }
        Some(("duplicate", args)) => {
            let copy = session.duplicate(&project_id(args))?;
            println!("Created {}", copy.id);
        }
        Some(("trash", _)) => {
            for project in session.visible_trash()? {
                print_card(project);
            }
        }
        Some(("restore", args)) => {
            if !session.restore(&project_id(args))? {
                bail!("not in trash");
            }
            println!("Restored");
        }
        Some(("purge", args)) => {
            if !session.permanently_delete(&project_id(args))? {
                bail!("not in trash");
            }
            println!("Deleted permanently");
        }
        Some(("empty-trash", _)) => println!("Removed {} entries", session.empty_trash()?),
        Some(("stats", _)) => {
            let stats = session.stats()?;
            println!("Total: {}", stats.total);
            println!("Completed: {} ({}%)", stats.completed, stats.completion_percent());
            match stats.average_cycle_days {
                Some(days) => println!("Average cycle: {days} days"),
                None => println!("Average cycle: -"),
            }
            println!("In trash: {}", stats.trash_count);
        }
        Some(("lists", _)) => {
            let lists = session.store().lists();
            for kind in [ListKind::Editor, ListKind::Platform, ListKind::Channel] {
                println!("{}s: {}", kind.label(), lists.get(kind).join(", "));
            }
        }
        Some(("list-add", args)) => {
            let kind = args.get_one::<ListKind>("kind").copied().context("list kind")?;
            session.add_list_entry(kind, &text(args, "value").unwrap_or_default())?;
            println!("Added");
        }
        Some(("list-remove", args)) => {
            let kind = args.get_one::<ListKind>("kind").copied().context("list kind")?;
            if !session.remove_list_entry(kind, &text(args, "value").unwrap_or_default())? {
                bail!("no such entry");
            }
            println!("Removed");
        }
        Some(("roles", _)) => {
            for role in session.roles()? {
                let kind = match session.registry().kind_of(&role.key) {
                    Some(RoleKind::BuiltIn) => "built-in",
                    Some(RoleKind::Custom) => "custom",
                    None => "?",
                };
                println!("  {} ({}, {kind}): {}", role.key, role.name, role.permissions);
            }
        }
        Some(("role-create", args)) => {
            let permissions: PermissionSet = args
                .get_many::<Permission>("permissions")
                .map(|values| values.copied().collect())
                .unwrap_or_default();
            let request = CustomRoleRequest::new(
                text(args, "name").unwrap_or_default(),
                text(args, "role-password").unwrap_or_default(),
            )
            .with_permissions(permissions)
            .view_only(args.get_flag("view-only"))
            .with_channels(strings(args, "channels"))
            .with_platforms(strings(args, "platforms"))
            .with_editors(strings(args, "editors"));
            let role = session.create_role(request)?;
            println!("Created role {}", role.key);
        }
        Some(("role-delete", args)) => {
            let role = session.delete_role(&RoleKey::new(text(args, "key").unwrap_or_default()))?;
            println!("Deleted role {}", role.key);
        }
        Some(("export", args)) => {
            let document = session.export()?;
            let json = document.to_json_pretty()?;
            let out = args
                .get_one::<PathBuf>("out")
                .cloned()
                .unwrap_or_else(|| PathBuf::from(document.file_name()));
            std::fs::write(&out, json).with_context(|| format!("writing {}", out.display()))?;
            println!("Exported to {}", out.display());
        }
        Some(("import", args)) => {
            let path = args.get_one::<PathBuf>("file").context("import file")?;
            let raw = std::fs::read_to_string(path).with_context(|| format!("reading {}", path.display()))?;
            let bundle = ImportBundle::parse(&raw)?;
            let count = bundle.projects.len();
            if session.import(bundle, args.get_flag("yes"))? {
                println!("Imported {count} projects");
            } else {
                println!("This will replace all current data; re-run with --yes to continue");
            }
        }
        _ => {}
    }
    Ok(())
}

fn report_transition(transition: Transition) {
    match transition {
        Transition::Moved { from, to } => println!("Moved {from} -> {to}"),
        Transition::Unchanged => println!("Already there"),
        Transition::Missing => println!("No such project"),
    }
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(std::io::stderr)
        .init();

    run(&cli().get_matches())
}
