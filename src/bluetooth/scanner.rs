//! Bluetooth Low Energy discovery of DevKit boards

use futures_util::StreamExt;
use log::{debug, error, info, warn};
use tokio::time::{sleep, Duration};

use crate::config::MonitorConfig;

/// A peripheral seen during discovery whose name passed the prefix filter
#[derive(Debug, Clone)]
pub struct DiscoveredBoard {
    pub address: bluer::Address,
    pub name: String,
    pub rssi: Option<i16>,
}

/// Scan for peripherals whose name matches the configured prefix
///
/// Discovery runs for `scan_duration_secs`, after which every device known to
/// the adapter is checked. Matches are returned strongest signal first.
///
/// # Arguments
/// * `adapter` - Powered Bluetooth adapter
/// * `config` - Configuration holding the name prefix and scan duration
///
/// # Returns
/// Result containing the matching boards, or error if the scan fails
pub async fn scan_for_boards(
    adapter: &bluer::Adapter,
    config: &MonitorConfig,
) -> Result<Vec<DiscoveredBoard>, Box<dyn std::error::Error>> {
    // The board only advertises over LE
    let filter = bluer::DiscoveryFilter {
        transport: bluer::DiscoveryTransport::Le,
        duplicate_data: false,
        ..Default::default()
    };

    if let Err(e) = adapter.set_discovery_filter(filter).await {
        warn!("Failed to set discovery filter: {}", e);
    }

    // Discovery has to stay active while the adapter collects advertisements
    let discovery_handle = match adapter.discover_devices().await {
        Ok(discovery_stream) => tokio::spawn(async move {
            let mut stream = Box::pin(discovery_stream);
            while let Some(event) = stream.next().await {
                debug!("Discovery event: {:?}", event);
            }
        }),
        Err(e) => {
            error!("Failed to start device discovery: {}", e);
            return Err(e.into());
        }
    };

    sleep(Duration::from_secs(config.scan_duration_secs)).await;
    discovery_handle.abort();

    let addresses = match adapter.device_addresses().await {
        Ok(addresses) => addresses,
        Err(e) => {
            error!("Failed to get device addresses: {}", e);
            return Err(e.into());
        }
    };

    let mut boards = Vec::new();

    for address in addresses {
        let device = match adapter.device(address) {
            Ok(device) => device,
            Err(_) => continue,
        };

        let name = device.name().await.unwrap_or(None);
        if !config.matches_name(name.as_deref()) {
            continue;
        }

        let rssi = device.rssi().await.unwrap_or(None);
        let name = name.unwrap_or_default();
        debug!("Found board '{}' at {} (rssi {:?})", name, address, rssi);

        boards.push(DiscoveredBoard {
            address,
            name,
            rssi,
        });
    }

    sort_by_signal(&mut boards);
    info!("Scan found {} matching board(s)", boards.len());

    Ok(boards)
}

/// Strongest signal first; boards without an RSSI go last
fn sort_by_signal(boards: &mut [DiscoveredBoard]) {
    boards.sort_by_key(|board| std::cmp::Reverse(board.rssi.unwrap_or(i16::MIN)));
}

#[cfg(test)]
mod tests {
    use super::*;

    fn board(name: &str, rssi: Option<i16>) -> DiscoveredBoard {
        DiscoveredBoard {
            address: bluer::Address::any(),
            name: name.to_string(),
            rssi,
        }
    }

    #[test]
    fn strongest_board_comes_first() {
        let mut boards = vec![
            board("far", Some(-90)),
            board("unknown", None),
            board("near", Some(-40)),
        ];
        sort_by_signal(&mut boards);
        let names: Vec<_> = boards.iter().map(|b| b.name.as_str()).collect();
        assert_eq!(names, vec!["near", "far", "unknown"]);
    }
}
