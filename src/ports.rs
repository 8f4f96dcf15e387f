use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, PartialOrd, Ord)]
#[serde(rename_all = "snake_case")]
pub enum PortKind {
    Usb,
    Pci,
    Bluetooth,
    Unknown,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PortInfo {
    pub port_name: String,
    pub kind: PortKind,
    pub vid: Option<u16>,
    pub pid: Option<u16>,
    pub manufacturer: Option<String>,
    pub product: Option<String>,
}

/// Serial ports the companion link could be attached to, sorted by kind then name.
pub fn list_ports() -> Result<Vec<PortInfo>, serialport::Error> {
    let mut out: Vec<PortInfo> = serialport::available_ports()?
        .into_iter()
        .map(port_info)
        .collect();

    out.sort_by(|a, b| a.kind.cmp(&b.kind).then_with(|| a.port_name.cmp(&b.port_name)));
    Ok(out)
}

fn port_info(p: serialport::SerialPortInfo) -> PortInfo {
    let serialport::SerialPortInfo {
        port_name,
        port_type,
    } = p;

    match port_type {
        serialport::SerialPortType::UsbPort(usb) => PortInfo {
            port_name,
            kind: PortKind::Usb,
            vid: Some(usb.vid),
            pid: Some(usb.pid),
            manufacturer: usb.manufacturer,
            product: usb.product,
        },
        other => PortInfo {
            port_name,
            kind: match other {
                serialport::SerialPortType::PciPort => PortKind::Pci,
                serialport::SerialPortType::BluetoothPort => PortKind::Bluetooth,
                _ => PortKind::Unknown,
            },
            vid: None,
            pid: None,
            manufacturer: None,
            product: None,
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_usb_port_info_keeps_ids() {
        let info = port_info(serialport::SerialPortInfo {
            port_name: "/dev/ttyACM0".to_string(),
            port_type: serialport::SerialPortType::UsbPort(serialport::UsbPortInfo {
                vid: 0x239A,
                pid: 0x800B,
                serial_number: None,
                manufacturer: Some("Adafruit".to_string()),
                product: Some("Feather M0".to_string()),
            }),
        });
        assert_eq!(info.kind, PortKind::Usb);
        assert_eq!(info.vid, Some(0x239A));
        assert_eq!(info.product.as_deref(), Some("Feather M0"));
    }

    #[test]
    fn test_non_usb_port_has_no_ids() {
        let info = port_info(serialport::SerialPortInfo {
            port_name: "/dev/ttyS0".to_string(),
            port_type: serialport::SerialPortType::Unknown,
        });
        assert_eq!(info.kind, PortKind::Unknown);
        assert_eq!(info.vid, None);
    }
}
