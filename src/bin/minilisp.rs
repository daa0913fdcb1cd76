use minilisp::{Error, Reader, Session, SessionConfig};
use rustyline::DefaultEditor;
use rustyline::error::ReadlineError;
use std::panic;
use std::process;
use tracing_subscriber::EnvFilter;

/// Install a stderr subscriber, but only when `RUST_LOG` asks for one
fn init_tracing() {
    if std::env::var_os("RUST_LOG").is_none() {
        return;
    }
    let _ = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .try_init();
}

fn main() {
    init_tracing();

    let mut session = Session::with_config(SessionConfig {
        echo_non_numeric: true,
    });

    if let Some(path) = std::env::args().nth(1) {
        process::exit(run_file(&mut session, &path));
    }

    let result = panic::catch_unwind(panic::AssertUnwindSafe(|| {
        run_repl(&mut session);
    }));

    if let Err(panic_info) = result {
        eprintln!("The REPL encountered an unexpected error and must exit.");

        if let Some(msg) = panic_info.downcast_ref::<&str>() {
            eprintln!("Error: {msg}");
        } else if let Some(msg) = panic_info.downcast_ref::<String>() {
            eprintln!("Error: {msg}");
        } else {
            eprintln!("Error: Unknown panic occurred");
        }

        process::exit(1);
    }
}

/// Evaluate every form in a file, printing each result. Returns the exit code.
fn run_file(session: &mut Session, path: &str) -> i32 {
    let source = match std::fs::read_to_string(path) {
        Ok(source) => source,
        Err(err) => {
            eprintln!("Error: cannot read {path}: {err}");
            return 1;
        }
    };

    match eval_and_print(session, &source) {
        Ok(()) => 0,
        Err(err) => {
            eprintln!("Error: {err}");
            1
        }
    }
}

/// Evaluate each form in `text`, printing results as they are produced
fn eval_and_print(session: &mut Session, text: &str) -> Result<(), Error> {
    let mut reader = Reader::new(text);
    while let Some(form) = session.read_next(&mut reader) {
        let value = session.eval(&form?)?;
        println!("=> {}", session.render(&value));
    }
    Ok(())
}

fn run_repl(session: &mut Session) {
    println!("MiniLisp");
    println!("Enter S-expressions like: (+ 1 2)");
    println!("Type :help for more commands, or Ctrl+C to exit.");
    println!();

    let mut rl = match DefaultEditor::new() {
        Ok(rl) => rl,
        Err(err) => {
            eprintln!("Could not initialize REPL: {err}");
            return;
        }
    };

    loop {
        match rl.readline("minilisp> ") {
            Ok(line) => {
                let line = line.trim();
                if line.is_empty() {
                    continue;
                }

                let _ = rl.add_history_entry(line);

                match line {
                    ":help" => {
                        print_help();
                        continue;
                    }
                    ":functions" => {
                        print_functions(session);
                        continue;
                    }
                    ":reset" => {
                        session.reset();
                        println!("Session reset.");
                        continue;
                    }
                    ":quit" | ":exit" => {
                        println!("Goodbye!");
                        break;
                    }
                    _ => {}
                }

                if let Err(e) = eval_and_print(session, line) {
                    println!("Error: {e}");
                }
            }

            Err(ReadlineError::Eof | ReadlineError::Interrupted) => {
                println!("Goodbye!");
                break;
            }
            Err(err) => {
                println!("Error: {err:?}");
                break;
            }
        }
    }
}

fn print_help() {
    println!("MiniLisp REPL:");
    println!("  :help      - Show this help message");
    println!("  :functions - List defined functions");
    println!("  :reset     - Forget all functions and symbols");
    println!("  :quit      - Exit the interpreter");
    println!("  :exit      - Exit the interpreter");
    println!("  Ctrl+C     - Exit the interpreter");
    println!();
    println!("Supported operations:");
    println!("  Numbers: 42, -5");
    println!("  Quote: 'x, '(1 2 3), (quote x)");
    println!("  Arithmetic: +, -, *, /");
    println!("  Lists: car, cdr");
    println!("  Comparison: =, <, >, <=, >= (1 is true, 0 is false)");
    println!("  Conditionals: (if cond then else)");
    println!("  Definitions: (defun name (params...) body)");
    println!();
    println!("Examples:");
    println!("  (+ 1 2 3)");
    println!("  (car (cdr '(10 20 30)))");
    println!("  (defun factorial (n) (if (< n 2) 1 (* n (factorial (- n 1)))))");
    println!("  (factorial 10)");
    println!();
}

fn print_functions(session: &Session) {
    let functions = session.functions();

    if functions.is_empty() {
        println!("No functions defined.");
        return;
    }

    println!("Defined functions ({} total):", functions.size());
    for (name, lambda) in functions.iter() {
        let params: Vec<String> = lambda
            .params()
            .iter()
            .map(|param| session.interner().resolve(*param).unwrap_or("?").to_owned())
            .collect();
        println!(
            "  ({} {}) = {}",
            session.interner().resolve(name).unwrap_or("?"),
            params.join(" "),
            session.display(lambda.body())
        );
    }
}
