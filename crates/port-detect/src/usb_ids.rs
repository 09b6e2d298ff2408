//! USB Vendor/Product ID names for common serial devices
//!
//! Used to give a port a readable name when the USB descriptor carries
//! no product string (common with cheap CH340 and PL2303 clones).

/// USB Vendor ID / Product ID pair
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct UsbId {
    pub vid: u16,
    pub pid: u16,
}

impl UsbId {
    pub const fn new(vid: u16, pid: u16) -> Self {
        Self { vid, pid }
    }
}

/// FTDI (Future Technology Devices International)
pub mod ftdi {
    use super::UsbId;

    pub const VID: u16 = 0x0403;

    pub const FT232R: UsbId = UsbId::new(VID, 0x6001);
    pub const FT2232: UsbId = UsbId::new(VID, 0x6010);
    pub const FT4232: UsbId = UsbId::new(VID, 0x6011);
    pub const FT232H: UsbId = UsbId::new(VID, 0x6014);
    pub const FT231X: UsbId = UsbId::new(VID, 0x6015);
}

/// Silicon Labs CP210x
pub mod cp210x {
    use super::UsbId;

    pub const VID: u16 = 0x10C4;

    pub const CP210X: UsbId = UsbId::new(VID, 0xEA60);
    pub const CP2105: UsbId = UsbId::new(VID, 0xEA70);
    pub const CP2108: UsbId = UsbId::new(VID, 0xEA71);
}

/// WCH CH340/CH341
pub mod ch340 {
    use super::UsbId;

    pub const VID: u16 = 0x1A86;

    pub const CH340: UsbId = UsbId::new(VID, 0x7523);
    pub const CH341: UsbId = UsbId::new(VID, 0x5523);
}

/// Prolific PL2303
pub mod prolific {
    use super::UsbId;

    pub const VID: u16 = 0x067B;

    pub const PL2303: UsbId = UsbId::new(VID, 0x2303);
}

/// Arduino boards with native USB or a 16U2 bridge
pub mod arduino {
    use super::UsbId;

    pub const VID: u16 = 0x2341;

    pub const UNO: UsbId = UsbId::new(VID, 0x0043);
    pub const MEGA_2560: UsbId = UsbId::new(VID, 0x0042);
    pub const LEONARDO: UsbId = UsbId::new(VID, 0x8036);
}

const KNOWN_DEVICES: &[(UsbId, &str)] = &[
    (ftdi::FT232R, "FTDI FT232R USB UART"),
    (ftdi::FT2232, "FTDI FT2232 USB UART"),
    (ftdi::FT4232, "FTDI FT4232 USB UART"),
    (ftdi::FT232H, "FTDI FT232H USB UART"),
    (ftdi::FT231X, "FTDI FT231X USB UART"),
    (cp210x::CP210X, "Silicon Labs CP210x USB to UART Bridge"),
    (cp210x::CP2105, "Silicon Labs CP2105 Dual USB to UART Bridge"),
    (cp210x::CP2108, "Silicon Labs CP2108 Quad USB to UART Bridge"),
    (ch340::CH340, "USB-SERIAL CH340"),
    (ch340::CH341, "USB-SERIAL CH341"),
    (prolific::PL2303, "Prolific USB-to-Serial Comm Port"),
    (arduino::UNO, "Arduino Uno"),
    (arduino::MEGA_2560, "Arduino Mega 2560"),
    (arduino::LEONARDO, "Arduino Leonardo"),
];

/// Name of a known device by exact VID/PID
pub fn device_name(id: UsbId) -> Option<&'static str> {
    KNOWN_DEVICES
        .iter()
        .find(|(known, _)| *known == id)
        .map(|(_, name)| *name)
}

/// Vendor name for a VID
pub fn vendor_name(vid: u16) -> Option<&'static str> {
    match vid {
        ftdi::VID => Some("FTDI"),
        cp210x::VID => Some("Silicon Labs"),
        ch340::VID => Some("WCH"),
        prolific::VID => Some("Prolific"),
        arduino::VID => Some("Arduino"),
        _ => None,
    }
}

/// Best available description of a USB device from its IDs alone
///
/// Falls back to "<vendor> USB serial device" when only the vendor is known.
pub fn describe(vid: u16, pid: u16) -> Option<String> {
    device_name(UsbId::new(vid, pid))
        .map(str::to_string)
        .or_else(|| vendor_name(vid).map(|v| format!("{} USB serial device", v)))
}
