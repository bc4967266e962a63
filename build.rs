#![allow(clippy::indexing_slicing, clippy::exit, clippy::unwrap_used)]
fn main() {
    // Re-invoked by the linker as its error-handling script.
    if std::env::args().len() > 2 {
        explain_link_error();
    }

    println!("cargo:rerun-if-changed=build.rs");

    // Host builds (tests, simulation) link normally; only the badge firmware
    // needs the esp linker scripts.
    if std::env::var_os("CARGO_FEATURE_BADGE").is_none() {
        return;
    }

    if std::env::var("PROFILE").unwrap_or_default() == "release" {
        println!("cargo:rustc-env=DEFMT_LOG=off");
    }

    println!(
        "cargo:rustc-link-arg=-Wl,--error-handling-script={}",
        std::env::current_exe().unwrap().display()
    );
    println!("cargo:rustc-link-arg=-Tdefmt.x");
    println!("cargo:rustc-link-arg=-Tlinkall.x");
}

fn explain_link_error() -> ! {
    let args: Vec<String> = std::env::args().collect();
    let kind = &args[1];
    let what = &args[2];

    match kind.as_str() {
        "undefined-symbol" => match what.as_str() {
            "_defmt_timestamp" => {
                eprintln!();
                eprintln!(
                    "💡 `defmt` not found - the badge build expects `esp-println` with `defmt-espflash`"
                );
                eprintln!();
            }
            "_stack_start" => {
                eprintln!();
                eprintln!("💡 Is the linker script `linkall.x` missing?");
                eprintln!();
            }
            "esp_rtos_initialized" | "esp_rtos_yield_task" | "esp_rtos_task_create" => {
                eprintln!();
                eprintln!("💡 `esp-rtos` was not started. Call `esp_rtos::start` before spawning tasks.");
                eprintln!();
            }
            _ => (),
        },
        _ => {
            std::process::exit(1);
        }
    }

    std::process::exit(0);
}
