// LED Demo Task - Zeigt Testmuster auf dem WS2812B Strang
use defmt::{error, info};
use embassy_time::{Duration, Timer};
use embedded_hal::delay::DelayNs;
use esp_core::logic::{ACCENT_COLORS, BASIC_COLORS, Primary, breath_levels, fade_levels, wheel};
use esp_core::traits::PulsePeripheral;
use esp_core::types::colors;
use esp_core::Ws2812Driver;
use rgb::RGB8;

use crate::LedDriver;
use crate::config::{
    DEMO_ACCENT_COLOR_MS, DEMO_BASIC_COLOR_MS, DEMO_BLINK_COUNT, DEMO_BLINK_MS,
    DEMO_BREATH_CYCLES, DEMO_BREATH_LEVEL_STEP, DEMO_BREATH_STEP_MS, DEMO_CYCLE_PAUSE_MS,
    DEMO_FADE_STEP_MS, DEMO_RAINBOW_STEP_MS, DEMO_SECTION_PAUSE_MS, DEMO_STARTUP_DELAY_MS,
};

/// Setzt alle LEDs auf `color` und sendet sofort
///
/// Fehler werden geloggt, das Demo läuft weiter.
fn show<P, D, const N: usize>(led: &mut Ws2812Driver<P, D, N>, color: RGB8)
where
    P: PulsePeripheral,
    D: DelayNs,
{
    if let Err(e) = led.set_all_pixels(color) {
        error!("LED: Failed to set pixels: {}", e);
        return;
    }
    if let Err(e) = led.refresh() {
        error!("LED: Refresh failed: {}", e);
    }
}

async fn show_for<P, D, const N: usize>(led: &mut Ws2812Driver<P, D, N>, color: RGB8, ms: u64)
where
    P: PulsePeripheral,
    D: DelayNs,
{
    show(led, color);
    Timer::after(Duration::from_millis(ms)).await;
}

/// Ein kompletter Durchlauf aller Testmuster
///
/// # Ablauf
/// 1. Grundfarben (Rot, Grün, Blau, Weiß)
/// 2. Farbrad mit 256 Schritten
/// 3. Fade hoch/runter pro Grundfarbe
/// 4. Weiß blinken
/// 5. Akzentfarben (Gelb, Cyan, Magenta, Orange, Lila)
/// 6. Atem-Effekt pro Grundfarbe
/// 7. Aus
pub async fn led_demo_cycle<P, D, const N: usize>(led: &mut Ws2812Driver<P, D, N>)
where
    P: PulsePeripheral,
    D: DelayNs,
{
    info!("LED: Basic colors");
    for color in BASIC_COLORS {
        show_for(led, color, DEMO_BASIC_COLOR_MS).await;
    }
    show(led, colors::BLACK);
    Timer::after(Duration::from_millis(DEMO_SECTION_PAUSE_MS)).await;

    info!("LED: Rainbow");
    for position in 0..=u8::MAX {
        show_for(led, wheel(position), DEMO_RAINBOW_STEP_MS).await;
    }
    show(led, colors::BLACK);
    Timer::after(Duration::from_millis(DEMO_SECTION_PAUSE_MS)).await;

    info!("LED: Fade");
    for primary in Primary::ALL {
        for level in fade_levels() {
            show_for(led, primary.with_level(level), DEMO_FADE_STEP_MS).await;
        }
    }
    show(led, colors::BLACK);
    Timer::after(Duration::from_millis(DEMO_SECTION_PAUSE_MS)).await;

    info!("LED: Blink");
    for _ in 0..DEMO_BLINK_COUNT {
        show_for(led, colors::WHITE, DEMO_BLINK_MS).await;
        show_for(led, colors::BLACK, DEMO_BLINK_MS).await;
    }
    Timer::after(Duration::from_millis(DEMO_SECTION_PAUSE_MS)).await;

    info!("LED: Accent colors");
    for color in ACCENT_COLORS {
        show_for(led, color, DEMO_ACCENT_COLOR_MS).await;
    }

    info!("LED: Breathing");
    for _ in 0..DEMO_BREATH_CYCLES {
        for primary in Primary::ALL {
            for level in breath_levels(DEMO_BREATH_LEVEL_STEP) {
                show_for(led, primary.with_level(level), DEMO_BREATH_STEP_MS).await;
            }
        }
    }

    show(led, colors::BLACK);
}

/// LED Demo Task - Embassy Task für parallele Ausführung
///
/// Bekommt den bereits initialisierten Treiber und wiederholt das Demo
/// endlos mit einer Pause am Ende jedes Durchlaufs.
#[embassy_executor::task]
pub async fn led_demo_task(mut led: LedDriver) {
    Timer::after(Duration::from_millis(DEMO_STARTUP_DELAY_MS)).await;

    loop {
        info!("LED: === Demo cycle start ===");
        led_demo_cycle(&mut led).await;
        info!("LED: === Demo cycle done, pausing {} ms ===", DEMO_CYCLE_PAUSE_MS);
        Timer::after(Duration::from_millis(DEMO_CYCLE_PAUSE_MS)).await;
    }
}
