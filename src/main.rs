//! Formsmith CLI: build, store and fill dynamic forms.

use std::env;
use std::fs;
use std::path::PathBuf;
use std::process;

use colored::Colorize;
use tracing_subscriber::EnvFilter;

use formsmith::builder;
use formsmith::error::FormsmithError;
use formsmith::formula::{self, format_number};
use formsmith::preview::{FieldStatus, FormSession};
use formsmith::store::{FileStore, FormStore};
use formsmith::{Config, FormSchema};

const VERSION: &str = env!("CARGO_PKG_VERSION", "0.3.0");

/// CLI command to execute.
enum Command {
    /// List saved forms
    List,
    /// Print one saved form
    Show { id: String },
    /// Build and save a form from a field definition file
    Build { file: String, name: String },
    /// Add a complete schema from a JSON file
    Import { file: String },
    /// Print a saved form as JSON
    Export { id: String },
    /// Fill a saved form and submit it
    Fill { id: String, assignments: Vec<String> },
    /// Evaluate an arithmetic expression
    Eval { expression: String },
}

/// CLI options parsed from arguments.
struct Options {
    command: Command,
    data_dir: Option<PathBuf>,
}

fn print_usage() {
    eprintln!("Formsmith {} - dynamic form builder", VERSION);
    eprintln!();
    eprintln!("Usage: formsmith [--data-dir DIR] <command> [args...]");
    eprintln!();
    eprintln!("Commands:");
    eprintln!("  list                       List saved forms");
    eprintln!("  show <id>                  Show a saved form's fields");
    eprintln!("  build <file> --name <name> Build a form from a JSON array of field definitions");
    eprintln!("  import <file>              Add a form schema from a JSON file");
    eprintln!("  export <id>                Print a saved form as JSON");
    eprintln!("  fill <id> [field=value...] Fill in a form by field label or id and submit it");
    eprintln!("  eval <expression>          Evaluate an arithmetic expression");
    eprintln!();
    eprintln!("Options:");
    eprintln!("  --data-dir DIR  Directory holding forms.json (default: ~/.formsmith)");
    eprintln!("  --help, -h      Show this help message");
    eprintln!();
    eprintln!("Environment:");
    eprintln!("  FORMSMITH_DATA_DIR  Data directory when --data-dir is not given");
    eprintln!("  FORMSMITH_LOG       Log filter (default: formsmith=warn)");
    eprintln!();
    eprintln!("Examples:");
    eprintln!("  formsmith build room.json --name \"Room\"");
    eprintln!("  formsmith fill 5f0c... Width=4 Height=5");
    eprintln!("  formsmith eval '(1 + 2) * 3'");
}

fn usage_error(message: &str) -> ! {
    eprintln!("{}", message);
    print_usage();
    process::exit(64);
}

fn parse_args() -> Options {
    let args: Vec<String> = env::args().skip(1).collect();
    let mut data_dir = None;

    let mut i = 0;
    while i < args.len() {
        match args[i].as_str() {
            "--help" | "-h" => {
                print_usage();
                process::exit(0);
            }
            "--version" | "-V" => {
                println!("formsmith {}", VERSION);
                process::exit(0);
            }
            "--data-dir" => {
                i += 1;
                if i >= args.len() {
                    usage_error("--data-dir requires a directory");
                }
                data_dir = Some(PathBuf::from(&args[i]));
            }
            arg if arg.starts_with("--data-dir=") => {
                data_dir = Some(PathBuf::from(&arg["--data-dir=".len()..]));
            }
            arg if arg.starts_with('-') => usage_error(&format!("Unknown option: {}", arg)),
            _ => break,
        }
        i += 1;
    }

    if i >= args.len() {
        usage_error("No command given");
    }

    let command_name = args[i].as_str();
    let rest = &args[i + 1..];
    let command = match command_name {
        "list" => Command::List,
        "show" | "export" => {
            let [id] = rest else {
                usage_error(&format!("{} requires a form id", command_name));
            };
            if command_name == "show" {
                Command::Show { id: id.clone() }
            } else {
                Command::Export { id: id.clone() }
            }
        }
        "build" => {
            let mut file = None;
            let mut name = None;
            let mut j = 0;
            while j < rest.len() {
                match rest[j].as_str() {
                    "--name" => {
                        j += 1;
                        if j >= rest.len() {
                            usage_error("--name requires a form name");
                        }
                        name = Some(rest[j].clone());
                    }
                    arg if arg.starts_with('-') => {
                        usage_error(&format!("Unknown option for build command: {}", arg))
                    }
                    arg => {
                        if file.is_some() {
                            usage_error(&format!("Unexpected argument: {}", arg));
                        }
                        file = Some(arg.to_string());
                    }
                }
                j += 1;
            }
            match (file, name) {
                (Some(file), Some(name)) => Command::Build { file, name },
                (None, _) => usage_error("build requires a definition file"),
                (_, None) => usage_error("build requires --name"),
            }
        }
        "import" => {
            let [file] = rest else {
                usage_error("import requires a schema file");
            };
            Command::Import { file: file.clone() }
        }
        "fill" => {
            let Some((id, assignments)) = rest.split_first() else {
                usage_error("fill requires a form id");
            };
            Command::Fill {
                id: id.clone(),
                assignments: assignments.to_vec(),
            }
        }
        "eval" => {
            if rest.is_empty() {
                usage_error("eval requires an expression");
            }
            Command::Eval {
                expression: rest.join(" "),
            }
        }
        other => usage_error(&format!("Unknown command: {}", other)),
    };

    Options { command, data_dir }
}

fn init_logging(filter: &str) {
    let filter = EnvFilter::try_new(filter).unwrap_or_else(|_| EnvFilter::new("formsmith=warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn main() {
    let options = parse_args();

    let cwd = env::current_dir().unwrap_or_else(|_| PathBuf::from("."));
    let config = match Config::load(options.data_dir.clone(), &cwd) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("{} {}", "Error:".red().bold(), e);
            process::exit(78);
        }
    };
    init_logging(&config.log_filter);

    let result = match &options.command {
        Command::Eval { expression } => run_eval(expression),
        command => {
            let mut store = formsmith::open_store(&config);
            let result = run_with_store(command, &mut store);
            if let Some(warning) = store.take_persist_warning() {
                eprintln!(
                    "{} forms could not be saved to {}: {}",
                    "Warning:".yellow().bold(),
                    config.data_dir.display(),
                    warning
                );
            }
            result
        }
    };

    match result {
        Ok(code) => process::exit(code),
        Err(e) => {
            eprintln!("{} {}", "Error:".red().bold(), e);
            let code = match e {
                FormsmithError::Usage(_) => 64,
                FormsmithError::FormNotFound(_) => 66,
                _ => 1,
            };
            process::exit(code);
        }
    }
}

fn run_with_store(
    command: &Command,
    store: &mut FormStore<FileStore>,
) -> Result<i32, FormsmithError> {
    match command {
        Command::List => run_list(store),
        Command::Show { id } => run_show(store, id),
        Command::Build { file, name } => run_build(store, file, name),
        Command::Import { file } => run_import(store, file),
        Command::Export { id } => run_export(store, id),
        Command::Fill { id, assignments } => run_fill(store, id, assignments),
        Command::Eval { expression } => run_eval(expression),
    }
}

fn run_list(store: &FormStore<FileStore>) -> Result<i32, FormsmithError> {
    let forms = store.saved_forms();
    if forms.is_empty() {
        println!("No saved forms.");
        return Ok(0);
    }

    for form in forms {
        println!(
            "{}  {}  {} ({} field{})",
            form.id.dimmed(),
            form.created_at.format("%Y-%m-%d %H:%M"),
            form.name.bold(),
            form.fields.len(),
            if form.fields.len() == 1 { "" } else { "s" }
        );
    }
    Ok(0)
}

fn saved<'a>(store: &'a FormStore<FileStore>, id: &str) -> Result<&'a FormSchema, FormsmithError> {
    store
        .saved_form(id)
        .ok_or_else(|| FormsmithError::FormNotFound(id.to_string()))
}

fn run_show(store: &FormStore<FileStore>, id: &str) -> Result<i32, FormsmithError> {
    let form = saved(store, id)?;
    println!("{}", form.name.bold());
    if let Some(description) = &form.description {
        println!("{}", description.dimmed());
    }
    println!();

    for field in form.display_fields() {
        let mut line = format!("  {} {}", field.label.bold(), format!("({})", field.kind).dimmed());
        if field.is_required() {
            line.push_str(&" required".yellow().to_string());
        }
        if !field.options.is_empty() {
            line.push_str(&format!(" [{}]", field.options.join(", ")));
        }
        if field.is_derived() {
            let parents: Vec<&str> = field
                .parent_fields
                .iter()
                .map(|id| form.field(id).map(|f| f.label.as_str()).unwrap_or(id.as_str()))
                .collect();
            line.push_str(&format!(
                " = {} from {}",
                field.computation_formula.cyan(),
                parents.join(", ")
            ));
        } else if !field.default_value.is_empty() {
            line.push_str(&format!(" default {}", field.default_value.display_text()));
        }
        println!("{}", line);
    }
    Ok(0)
}

fn run_build(
    store: &mut FormStore<FileStore>,
    file: &str,
    name: &str,
) -> Result<i32, FormsmithError> {
    let content = fs::read_to_string(file)?;
    let definitions: Vec<serde_json::Value> = serde_json::from_str(&content)?;

    let fields = definitions
        .iter()
        .enumerate()
        .map(|(index, definition)| builder::from_definition(definition, index, index as i64))
        .collect::<Result<Vec<_>, _>>()?;
    builder::check_unique_ids(&fields)?;

    store.start_new_form();
    for field in fields {
        store.add_field_to_working_form(field);
    }

    // Parents may be named by label; resolve once every field exists.
    let fields = store
        .working_form()
        .map(|form| form.fields.clone())
        .unwrap_or_default();
    for field in fields.iter().filter(|f| f.is_derived()) {
        let resolved = builder::resolve_parent_refs(field, &fields);
        if resolved.parent_fields.len() != field.parent_fields.len() {
            eprintln!(
                "{} some parent fields of '{}' were not found and were dropped",
                "Warning:".yellow().bold(),
                field.label
            );
        }
        store.update_field_in_working_form(resolved);
    }

    let id = store.save_working_form(name)?;
    println!("{} form '{}' ({})", "Saved".green().bold(), name.trim(), id);
    Ok(0)
}

fn run_import(store: &mut FormStore<FileStore>, file: &str) -> Result<i32, FormsmithError> {
    let content = fs::read_to_string(file)?;
    let form: FormSchema = serde_json::from_str(&content)?;
    if form.name.trim().is_empty() {
        return Err(formsmith::error::StoreError::EmptyName.into());
    }
    builder::check_unique_ids(&form.fields)?;
    if store.saved_form(&form.id).is_some() {
        return Err(FormsmithError::usage(format!(
            "a form with id '{}' already exists",
            form.id
        )));
    }

    let name = form.name.clone();
    let id = store.add_form(form);
    println!("{} form '{}' ({})", "Imported".green().bold(), name, id);
    Ok(0)
}

fn run_export(store: &FormStore<FileStore>, id: &str) -> Result<i32, FormsmithError> {
    let form = saved(store, id)?;
    println!("{}", serde_json::to_string_pretty(form)?);
    Ok(0)
}

fn run_fill(
    store: &mut FormStore<FileStore>,
    id: &str,
    assignments: &[String],
) -> Result<i32, FormsmithError> {
    let schema = store
        .select_form_for_preview(id)
        .cloned()
        .ok_or_else(|| FormsmithError::FormNotFound(id.to_string()))?;
    let mut session = FormSession::new(schema);

    for assignment in assignments {
        let Some((key, raw)) = assignment.split_once('=') else {
            return Err(FormsmithError::usage(format!(
                "expected field=value, got '{}'",
                assignment
            )));
        };
        let field = session
            .schema()
            .find_field(key)
            .cloned()
            .ok_or_else(|| FormsmithError::usage(format!("no field named '{}'", key.trim())))?;
        if field.is_derived() {
            eprintln!(
                "{} '{}' is derived and cannot be set",
                "Warning:".yellow().bold(),
                field.label
            );
            continue;
        }
        session.set_input(&field.id, raw);
    }

    for (field_id, message) in session.advisories() {
        tracing::debug!(field = %field_id, "rule advisory");
        eprintln!("{} {}", "Note:".yellow().bold(), message);
    }

    let outcome = session.submit();

    println!("{}", session.schema().name.bold());
    for rendered in session.render() {
        let marker = match session.field_status(&rendered.id) {
            FieldStatus::Invalid => "✗".red(),
            FieldStatus::Valid | FieldStatus::Edited => "✓".green(),
            FieldStatus::Untouched => "·".dimmed(),
        };
        println!("  {} {}", marker, rendered);
        if let Some(help) = &rendered.help_text {
            println!("      {}", help.dimmed());
        }
    }
    println!();

    match outcome {
        Ok(submission) => {
            println!("{}", "Submitted".green().bold());
            println!("{}", serde_json::to_string_pretty(&submission)?);
            Ok(0)
        }
        Err(errors) => {
            eprintln!("{}", "Please fix the following fields:".red().bold());
            for message in errors.values() {
                eprintln!("  - {}", message);
            }
            Ok(1)
        }
    }
}

fn run_eval(expression: &str) -> Result<i32, FormsmithError> {
    let value = formula::evaluate(expression)?;
    if value.is_finite() {
        println!("{}", format_number(value));
        Ok(0)
    } else {
        println!("{}", formsmith::derived::INVALID_CALCULATION);
        Ok(1)
    }
}
