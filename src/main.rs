use std::path::PathBuf;
use std::process::ExitCode;

use clap::{CommandFactory, Parser};
use raytracing_scene::scene_parser::{SceneParser, DEFAULT_ASSETS_DIR};

/// Loads a scene description and prints the validated scene.
#[derive(Parser, Debug)]
#[command(version, about)]
struct Args {
    /// Scene document (XML)
    scene: Option<PathBuf>,

    /// Directory mesh files are looked up in
    #[arg(long, env = "SCENE_ASSETS_DIR", default_value = DEFAULT_ASSETS_DIR)]
    assets: PathBuf,
}

/// Help and version requests succeed; any other command-line error is a usage error.
fn command_line_status(err: &clap::Error) -> u8 {
    if err.use_stderr() {
        1
    } else {
        0
    }
}

fn main() -> ExitCode {
    env_logger::init();
    let args = match Args::try_parse() {
        Ok(args) => args,
        Err(err) => {
            // stdout or stderr may already be closed
            let _ = err.print();
            return ExitCode::from(command_line_status(&err));
        }
    };
    let Some(scene_path) = args.scene else {
        eprintln!("{}", Args::command().render_usage());
        return ExitCode::from(1);
    };

    let parser = SceneParser::new(args.assets);
    match parser.load_scene_from_file(&scene_path) {
        Ok(scene) => {
            println!("{}", scene);
            println!("Parsed OK!");
            ExitCode::SUCCESS
        }
        Err(err) => {
            log::debug!("{:?}", err);
            eprintln!("Parse error: {}", err);
            ExitCode::from(2)
        }
    }
}
