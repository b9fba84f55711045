//! Host-side helper: `cargo run` builds the wasm package into `static/pkg`,
//! serves `static/` locally and, if ngrok is installed, tunnels it over HTTPS
//! so phones can grant camera access.

use std::process::{Child, Command, Stdio};
use std::{env, io, thread, time::Duration};

fn build_wasm() -> io::Result<()> {
    println!("Building WASM pkg …");
    let status = Command::new("wasm-pack")
        .args(["build", "--release", "--target", "web", "--out-dir", "static/pkg"])
        .status()?;
    if !status.success() {
        return Err(io::Error::new(
            io::ErrorKind::Other,
            "wasm-pack finished with errors (https://rustwasm.github.io/wasm-pack/)",
        ));
    }
    Ok(())
}

fn serve(port: &str) -> io::Result<Child> {
    println!("Serving static/ at http://127.0.0.1:{port} …");
    Command::new("python3")
        .args(["-m", "http.server", port, "--directory", "static"])
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .spawn()
}

fn main() {
    let port = env::var("PORT").unwrap_or_else(|_| "8000".to_string());

    match build_wasm() {
        Ok(()) => {}
        Err(e) if e.kind() == io::ErrorKind::NotFound => {
            eprintln!("wasm-pack not found in PATH. Serving whatever is already in static/pkg.");
        }
        Err(e) => {
            eprintln!("{e}");
            std::process::exit(1);
        }
    }

    let _server = match serve(&port) {
        Ok(child) => child,
        Err(e) => {
            eprintln!("failed to start http server: {e}");
            std::process::exit(1);
        }
    };

    match Command::new("ngrok")
        .args(["http", port.as_str()])
        .stdout(Stdio::inherit())
        .stderr(Stdio::inherit())
        .spawn()
    {
        Ok(_) => println!("ngrok tunnel starting …"),
        Err(_) => eprintln!("ngrok not found; camera access from other devices needs HTTPS."),
    }

    // Keep process alive
    loop {
        thread::sleep(Duration::from_secs(60));
    }
}
