use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};

static EXTERNAL_CAMERA: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)logitech|usb|external|hd|webcam|facetime").expect("valid camera pattern")
});

static BUILT_IN_CAMERA: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)integrated|built[- ]?in").expect("valid camera pattern"));

/// A media input as reported by device enumeration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MediaDevice {
    pub id: String,
    pub label: String,
}

impl MediaDevice {
    pub fn new(id: impl Into<String>, label: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            label: label.into(),
        }
    }
}

/// Label heuristic for an external camera.
pub fn looks_external_camera(label: &str) -> bool {
    EXTERNAL_CAMERA.is_match(label) && !BUILT_IN_CAMERA.is_match(label)
}

/// Moves `first` to the front, keeping the rest in enumeration order.
fn ordered_from(devices: &[MediaDevice], first: Option<usize>) -> Vec<&MediaDevice> {
    let Some(first) = first else {
        return devices.iter().collect();
    };
    std::iter::once(&devices[first])
        .chain(
            devices
                .iter()
                .enumerate()
                .filter(|(i, _)| *i != first)
                .map(|(_, d)| d),
        )
        .collect()
}

/// Camera open order: the persisted id if still enumerated, else the first
/// external-looking camera, else the first device; then every other device.
pub fn camera_candidates<'a>(
    devices: &'a [MediaDevice],
    persisted: Option<&str>,
) -> Vec<&'a MediaDevice> {
    let first = persisted
        .and_then(|id| devices.iter().position(|d| d.id == id))
        .or_else(|| devices.iter().position(|d| looks_external_camera(&d.label)));
    ordered_from(devices, first)
}

/// Microphone open order: the persisted id if still enumerated, else
/// enumeration order.
pub fn microphone_candidates<'a>(
    devices: &'a [MediaDevice],
    persisted: Option<&str>,
) -> Vec<&'a MediaDevice> {
    let first = persisted.and_then(|id| devices.iter().position(|d| d.id == id));
    ordered_from(devices, first)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn devices() -> Vec<MediaDevice> {
        vec![
            MediaDevice::new("a", "Integrated Camera"),
            MediaDevice::new("b", "Logitech HD Webcam C920"),
            MediaDevice::new("c", "Virtual Cam"),
        ]
    }

    fn ids(list: Vec<&MediaDevice>) -> Vec<&str> {
        list.into_iter().map(|d| d.id.as_str()).collect()
    }

    #[test]
    fn test_label_heuristic() {
        assert!(looks_external_camera("Logitech HD Webcam C920"));
        assert!(looks_external_camera("FaceTime HD Camera"));
        assert!(looks_external_camera("USB2.0 Camera"));
        assert!(!looks_external_camera("Integrated Webcam"));
        assert!(!looks_external_camera("Built-in HD camera"));
        assert!(!looks_external_camera("BuiltIn USB cam"));
        assert!(!looks_external_camera("Virtual Cam"));
    }

    #[test]
    fn test_persisted_id_wins() {
        assert_eq!(ids(camera_candidates(&devices(), Some("c"))), ["c", "a", "b"]);
    }

    #[test]
    fn test_missing_persisted_id_falls_back_to_heuristic() {
        assert_eq!(
            ids(camera_candidates(&devices(), Some("gone"))),
            ["b", "a", "c"]
        );
    }

    #[test]
    fn test_no_heuristic_match_keeps_enumeration_order() {
        let list = vec![
            MediaDevice::new("x", "Front Camera"),
            MediaDevice::new("y", "Rear Camera"),
        ];
        assert_eq!(ids(camera_candidates(&list, None)), ["x", "y"]);
    }

    #[test]
    fn test_empty_enumeration() {
        assert!(camera_candidates(&[], Some("a")).is_empty());
    }

    #[test]
    fn test_microphone_candidates() {
        let list = vec![
            MediaDevice::new("m1", "Default"),
            MediaDevice::new("m2", "Headset"),
        ];
        assert_eq!(ids(microphone_candidates(&list, Some("m2"))), ["m2", "m1"]);
        assert_eq!(ids(microphone_candidates(&list, Some("zz"))), ["m1", "m2"]);
    }
}
