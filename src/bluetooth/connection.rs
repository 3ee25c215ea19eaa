//! GATT session with a connected DevKit board

use futures_util::stream::{self, LocalBoxStream, StreamExt};
use log::{debug, error, info, warn};
use std::collections::HashMap;
use uuid::Uuid;

use bluer::gatt::{remote, CharacteristicFlags};

use crate::board::Board;
use crate::bluetooth::characteristic::{self, Characteristic};
use crate::models::LedState;

/// A known characteristic and the properties it advertised at discovery
struct DiscoveredCharacteristic {
    remote: remote::Characteristic,
    flags: CharacteristicFlags,
}

/// Connected board with its discovered characteristics
pub struct BoardConnection {
    device: bluer::Device,
    characteristics: HashMap<Characteristic, DiscoveredCharacteristic>,
}

impl BoardConnection {
    /// Connect to the device at `address` and walk its services for known characteristics
    pub async fn connect(
        adapter: &bluer::Adapter,
        address: bluer::Address,
    ) -> Result<Self, Box<dyn std::error::Error>> {
        let device = adapter.device(address)?;
        if !device.is_connected().await? {
            info!("Connecting to {}", device.address());
            device.connect().await?;
        }

        let mut characteristics = HashMap::new();

        for service in device.services().await? {
            let service_uuid = service.uuid().await?;
            debug!(
                "Service: {} ({})",
                service_uuid,
                characteristic::service_name(&service_uuid).unwrap_or("unknown")
            );

            for remote_characteristic in service.characteristics().await? {
                let uuid = remote_characteristic.uuid().await?;
                let flags = remote_characteristic.flags().await?;
                debug!(
                    "  Characteristic: {} -{}{}{}",
                    uuid,
                    if flags.read { " Read" } else { "" },
                    if flags.write { " Write" } else { "" },
                    if flags.notify { " Notify" } else { "" }
                );

                if let Some(known) = Characteristic::from_uuid(&uuid) {
                    characteristics.insert(
                        known,
                        DiscoveredCharacteristic {
                            remote: remote_characteristic,
                            flags,
                        },
                    );
                }
            }
        }

        info!(
            "Discovered {} of {} known characteristics",
            characteristics.len(),
            Characteristic::ALL.len()
        );

        Ok(BoardConnection {
            device,
            characteristics,
        })
    }

    pub async fn is_connected(&self) -> bool {
        self.device.is_connected().await.unwrap_or(false)
    }

    /// Read every readable known characteristic once
    pub async fn read_all(&self, board: &mut Board) {
        for known in Characteristic::ALL {
            self.read_into(known, board).await;
        }
    }

    /// Read the characteristics that are polled on every tick
    pub async fn poll(&self, board: &mut Board) {
        debug!("Polling for {} characteristics", Characteristic::POLLED.len());
        for known in Characteristic::POLLED {
            self.read_into(known, board).await;
        }
    }

    async fn read_into(&self, known: Characteristic, board: &mut Board) {
        let Some(discovered) = self.characteristics.get(&known) else {
            return;
        };
        if !discovered.flags.read {
            return;
        }

        match discovered.remote.read().await {
            Ok(value) => {
                if let Some(reading) = characteristic::decode(&known.uuid(), Some(&value)) {
                    board.apply(reading);
                }
            }
            Err(e) => warn!("Failed to read {}: {}", known.name(), e),
        }
    }

    /// Subscribe to the characteristics the board notifies
    ///
    /// The button is always subscribed; acceleration only when requested.
    /// Items are tagged with the identifier of the notifying characteristic.
    pub async fn notifications(
        &self,
        notify_acceleration: bool,
    ) -> Result<LocalBoxStream<'_, (Uuid, Vec<u8>)>, Box<dyn std::error::Error>> {
        let mut subscribed = vec![Characteristic::DigitalFromBoard];
        if notify_acceleration {
            subscribed.push(Characteristic::Acceleration);
        }

        let mut streams = Vec::new();

        for known in subscribed {
            let Some(discovered) = self.characteristics.get(&known) else {
                warn!("{} characteristic not found, not subscribing", known.name());
                continue;
            };

            if !discovered.flags.notify {
                warn!("{} characteristic does not support notify", known.name());
                continue;
            }

            let uuid = known.uuid();
            let values = discovered.remote.notify().await?;
            streams.push(values.map(move |value| (uuid, value)).boxed_local());
            info!("Subscribed to {} notifications", known.name());
        }

        Ok(stream::select_all(streams).boxed_local())
    }

    /// Write the LED and buzzer state to the board
    pub async fn write_led(
        &self,
        state: LedState,
        board: &mut Board,
    ) -> Result<(), Box<dyn std::error::Error>> {
        let discovered = self
            .characteristics
            .get(&Characteristic::DigitalToBoard)
            .ok_or("LED characteristic not found")?;

        let value = board.set_led(state);
        info!("Writing {} to LED characteristic", value);
        discovered.remote.write(&[value]).await?;
        Ok(())
    }

    pub async fn disconnect(&self) {
        if let Err(e) = self.device.disconnect().await {
            error!("Failed to disconnect from {}: {}", self.device.address(), e);
        }
    }
}
