// Build-Script: Wird vor dem Kompilieren ausgeführt
// Backt die WiFi-Credentials aus .env in die Firmware ein und setzt die
// Linker-Skripte für ESP32-C6 (defmt + linkall)

fn main() {
    // Wird das Script vom Linker als Error-Handler aufgerufen, nur Tipp ausgeben
    let args: Vec<String> = std::env::args().collect();
    if let [_, kind, symbol, ..] = args.as_slice() {
        report_link_error(kind, symbol);
    }

    load_wifi_credentials();

    // 1. defmt.x - Symbole für defmt's binäres Log-Format
    println!("cargo:rustc-link-arg=-Tdefmt.x");
    // 2. linkall.x - Flash/RAM-Layout, muss als LETZTES kommen
    println!("cargo:rustc-link-arg=-Tlinkall.x");

    match std::env::current_exe() {
        Ok(exe) => println!(
            "cargo:rustc-link-arg=--error-handling-script={}",
            exe.display()
        ),
        Err(e) => eprintln!("⚠️  Linker error handler nicht registriert: {}", e),
    }
}

/// WIFI_SSID / WIFI_PASSWORD aus .env oder der Umgebung an rustc weitergeben
///
/// Fehlen beide, schlägt erst `env!` in `config.rs` fehl.
fn load_wifi_credentials() {
    if let Err(e) = dotenvy::dotenv() {
        eprintln!("⚠️  .env file nicht gefunden: {}", e);
        eprintln!("   Setze WIFI_SSID und WIFI_PASSWORD als Environment-Variablen");
    }

    println!("cargo:rerun-if-changed=.env");
    for key in ["WIFI_SSID", "WIFI_PASSWORD"] {
        println!("cargo:rerun-if-env-changed={}", key);
        if let Ok(value) = std::env::var(key) {
            println!("cargo:rustc-env={}={}", key, value);
        }
    }
}

/// Tipp zu einem undefinierten Symbol ausgeben und den Prozess beenden
fn report_link_error(kind: &str, symbol: &str) -> ! {
    if kind != "undefined-symbol" {
        std::process::exit(1);
    }

    if let Some(hint) = linker_hint(symbol) {
        eprintln!();
        eprintln!("💡 {}", hint);
        eprintln!();
    }
    std::process::exit(0);
}

fn linker_hint(symbol: &str) -> Option<&'static str> {
    match symbol {
        s if s.starts_with("_defmt_") => Some(
            "`defmt` symbols missing - is `defmt.x` passed to the linker and `esp-println` built with `defmt-espflash`?",
        ),
        "_stack_start" => Some("Is the linker script `linkall.x` missing?"),
        s if s.starts_with("esp_rtos_") => Some(
            "`esp-radio` needs a scheduler - call `esp_rtos::start()` before `esp_radio::init()`.",
        ),
        "free" | "malloc" | "calloc" | "get_free_internal_heap_size" | "malloc_internal"
        | "realloc_internal" | "calloc_internal" | "free_internal" => Some(
            "WiFi needs a heap - check the `esp-alloc` dependency and its `heap_allocator!` calls in main.rs.",
        ),
        _ => None,
    }
}
