use futures_util::StreamExt;
use log::{error, info, warn};
use time::OffsetDateTime;
use tokio::time::{interval, Duration, MissedTickBehavior};

use devkit_monitor::bluetooth::{decode, scan_for_boards, BoardConnection};
use devkit_monitor::board::Board;
use devkit_monitor::config::MonitorConfig;
use devkit_monitor::shutdown::{self, ShutdownSignal};
use devkit_monitor::utils::{format_datetime, summarize};

const RESCAN_DELAY_SECS: u64 = 5;
const SUMMARY_EVERY_POLLS: u32 = 30;

/// Poll and listen to one connected board until it disconnects or shutdown is requested
async fn monitor_board(
    connection: &BoardConnection,
    config: &MonitorConfig,
    board: &mut Board,
    shutdown: &mut ShutdownSignal,
) -> Result<(), Box<dyn std::error::Error>> {
    connection.read_all(board).await;

    if let Some(state) = config.led_on_connect {
        if let Err(e) = connection.write_led(state, board).await {
            warn!("Failed to set LED state: {}", e);
        }
    }

    let mut notifications = connection
        .notifications(config.notify_acceleration)
        .await?;

    let mut poll_timer = interval(Duration::from_secs(config.poll_interval_secs));
    poll_timer.set_missed_tick_behavior(MissedTickBehavior::Delay);
    let mut polls: u32 = 0;

    loop {
        tokio::select! {
            _ = poll_timer.tick() => {
                if !connection.is_connected().await {
                    warn!("Board '{}' disconnected", board.name);
                    return Ok(());
                }

                connection.poll(board).await;

                polls = polls.wrapping_add(1);
                if polls % SUMMARY_EVERY_POLLS == 0 {
                    log_summary(board);
                }
            }
            Some((uuid, value)) = notifications.next() => {
                if let Some(reading) = decode(&uuid, Some(&value)) {
                    board.apply(reading);
                }
            }
            _ = shutdown.requested() => {
                info!("Shutdown requested, leaving board '{}'", board.name);
                return Ok(());
            }
        }
    }
}

fn log_summary(board: &Board) {
    info!(
        "Summary for {} at {}:",
        board.formatted_name(),
        format_datetime(&OffsetDateTime::now_utc())
    );
    info!("  Temperature: {}", board.formatted_temperature());
    info!("  Pressure: {}", board.formatted_pressure());
    info!("  Visible light: {}", board.formatted_ambient_visible_light());
    info!("  Infrared light: {}", board.formatted_ambient_infrared_light());
    info!("  Battery: {} ({})", board.formatted_battery_level(), board.formatted_ac_status());
    info!(
        "  Wi-Fi: {} {}",
        board.formatted_wifi_name(),
        board.formatted_wifi_signal_strength()
    );
    info!("  Cellular: {}, IMEI {}", board.formatted_cell_signal_strength(), board.formatted_imei());
    info!("  Lights: {}", board.formatted_light_status());

    if let Some((latitude, longitude)) = board.location.coordinate() {
        info!("  Location: {:.6}, {:.6}", latitude, longitude);
    }

    if let Some(summary) = summarize(&board.temperature_history) {
        info!(
            "  Average temperature: {:.2}°C (min {:.2}, max {:.2}) over {} samples",
            summary.average, summary.min, summary.max, summary.samples
        );
    }
}

async fn main_loop(
    config: MonitorConfig,
    mut shutdown: ShutdownSignal,
) -> Result<(), Box<dyn std::error::Error>> {
    info!("Starting DevKit board monitor");

    // Initialize Bluetooth session
    let session = bluer::Session::new().await?;
    let adapter = session.default_adapter().await?;
    adapter.set_powered(true).await?;

    let mut board = Board::new(config.sensor_cache_size);
    let rescan_delay = Duration::from_secs(RESCAN_DELAY_SECS);

    loop {
        let scanned = tokio::select! {
            result = scan_for_boards(&adapter, &config) => result,
            _ = shutdown.requested() => return Ok(()),
        };

        let boards = match scanned {
            Ok(boards) => boards,
            Err(e) => {
                error!("Scan failed: {}", e);
                if !shutdown.sleep(rescan_delay).await {
                    return Ok(());
                }
                continue;
            }
        };

        let Some(found) = boards.into_iter().next() else {
            warn!("No board found, scanning again");
            if !shutdown.sleep(rescan_delay).await {
                return Ok(());
            }
            continue;
        };

        let connection = match BoardConnection::connect(&adapter, found.address).await {
            Ok(connection) => connection,
            Err(e) => {
                error!("Failed to connect to '{}': {}", found.name, e);
                if !shutdown.sleep(rescan_delay).await {
                    return Ok(());
                }
                continue;
            }
        };

        board.name = found.name;
        board.set_connected(true);
        info!("App is connected to board '{}'", board.name);

        if !shutdown.is_requested() {
            if let Err(e) = monitor_board(&connection, &config, &mut board, &mut shutdown).await {
                error!("Session with '{}' ended: {}", board.name, e);
            }
        }

        connection.disconnect().await;
        info!("Disconnected from board '{}'", board.name);
        board.set_connected(false);

        if !shutdown.sleep(rescan_delay).await {
            return Ok(());
        }
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize logging
    env_logger::Builder::from_default_env()
        .filter_level(log::LevelFilter::Info)
        .format_timestamp_secs()
        .init();

    // Load configuration
    let config = match MonitorConfig::new() {
        Ok(config) => config,
        Err(e) => {
            error!("Failed to load configuration: {}", e);
            return Err(e);
        }
    };

    // Handle Ctrl+C gracefully
    let (trigger, signal) = shutdown::channel();
    tokio::spawn(async move {
        if let Err(e) = tokio::signal::ctrl_c().await {
            error!("Failed to listen for Ctrl+C: {}", e);
            return;
        }
        info!("Program terminated by user. Exiting gracefully.");
        trigger.trigger();
    });

    // The loop disconnects from the board before returning on shutdown
    match main_loop(config, signal).await {
        Ok(_) => info!("Program completed successfully"),
        Err(e) => error!("Fatal error: {}", e),
    }

    Ok(())
}
