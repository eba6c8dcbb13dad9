//! Neighbor navigation across container boundaries.

use std::sync::Arc;

use detector_id::*;

const TWO_STATIONS: &str = r#"
name = "Stitching"

[[field]]
name = "subdet"
labels = { Scintillator = 2 }

[[field]]
name = "part"
labels = { Veto = 1 }

[[field]]
name = "station"

[[field]]
name = "plate"

[[field]]
name = "pmt"

[[region]]
subdet = "Scintillator"
part = "Veto"
station = { min = 0, max = 1 }
plate = { min = 0, max = 2 }
pmt = 0

[[detector]]
name = "Veto"
prefix = { subdet = "Scintillator", part = "Veto" }
hash_level = "plate"
axes = [{ axis = "z", field = "plate", container = "station" }]
"#;

fn helper(dict: &str, detector: &str) -> ScintillatorId {
    let dict = Dictionary::from_str(dict).unwrap();
    let tables = Arc::new(CodecTables::build(&dict).unwrap());
    ScintillatorId::new(&tables, detector).unwrap()
}

#[test]
fn test_two_stations_three_plates() {
    let veto = helper(TWO_STATIONS, "Veto");
    let hash = |station, plate| veto.plate_hash(veto.plate_id(station, plate).unwrap()).unwrap();

    assert_eq!(veto.plate_hash_max(), 6);
    assert_eq!(veto.next_in_z(hash(0, 2)), Some(hash(1, 0)));
    assert_eq!(veto.prev_in_z(hash(1, 0)), Some(hash(0, 2)));
    assert_eq!(veto.prev_in_z(hash(0, 0)), None);
    assert_eq!(veto.next_in_z(hash(1, 2)), None);

    // Inside a station navigation is plain stepping.
    assert_eq!(veto.next_in_z(hash(0, 0)), Some(hash(0, 1)));
    assert_eq!(veto.prev_in_z(hash(1, 2)), Some(hash(1, 1)));
}

#[test]
fn test_walk_visits_every_plate_in_order() {
    let veto = helper(TWO_STATIONS, "Veto");

    let mut visited = Vec::new();
    let mut current = Some(IdentifierHash::new(0));
    while let Some(hash) = current {
        let id = veto.plate_id_from_hash(hash).unwrap();
        visited.push((veto.station(id), veto.plate(id)));
        current = veto.next_in_z(hash);
    }

    assert_eq!(
        visited,
        vec![(0, 0), (0, 1), (0, 2), (1, 0), (1, 1), (1, 2)]
    );
}

#[test]
fn test_minimal_two_plates() {
    let single = TWO_STATIONS
        .replace("station = { min = 0, max = 1 }", "station = 0")
        .replace("plate = { min = 0, max = 2 }", "plate = { min = 0, max = 1 }");
    let veto = helper(&single, "Veto");

    let h0 = veto.plate_hash(veto.plate_id(0, 0).unwrap()).unwrap();
    let h1 = veto.plate_hash(veto.plate_id(0, 1).unwrap()).unwrap();
    assert_eq!(h0.value(), 0);
    assert_eq!(h1.value(), 1);

    assert_eq!(veto.next_in_z(h0), Some(h1));
    assert_eq!(veto.prev_in_z(h1), Some(h0));
    assert_eq!(veto.prev_in_z(h0), None);
    assert_eq!(veto.next_in_z(h1), None);
}

#[test]
fn test_uneven_stations_land_on_extremes() {
    // Station 0 has three plates, station 1 only two.
    let uneven = TWO_STATIONS.replace(
        "station = { min = 0, max = 1 }\nplate = { min = 0, max = 2 }\npmt = 0\n",
        "station = 0\nplate = { min = 0, max = 2 }\npmt = 0\n\n\
         [[region]]\nsubdet = \"Scintillator\"\npart = \"Veto\"\nstation = 1\nplate = { min = 0, max = 1 }\npmt = 0\n",
    );
    let veto = helper(&uneven, "Veto");
    let hash = |station, plate| veto.plate_hash(veto.plate_id(station, plate).unwrap()).unwrap();

    assert_eq!(veto.plate_hash_max(), 5);
    assert_eq!(veto.next_in_z(hash(0, 2)), Some(hash(1, 0)));
    assert_eq!(veto.prev_in_z(hash(1, 0)), Some(hash(0, 2)));
    assert_eq!(veto.next_in_z(hash(1, 1)), None);
}

#[test]
fn test_pmt_count_may_depend_on_plate() {
    // Plate 1 carries a second pmt, plate 0 does not.
    let nested = TWO_STATIONS.replace(
        "station = { min = 0, max = 1 }\nplate = { min = 0, max = 2 }\npmt = 0\n",
        "station = 0\nplate = { min = 0, max = 1 }\npmt = 0\n\n\
         [[region]]\nsubdet = \"Scintillator\"\npart = \"Veto\"\nstation = 0\nplate = 1\npmt = 1\n",
    );
    let veto = helper(&nested, "Veto");

    assert_eq!(veto.plate_hash_max(), 2);
    assert_eq!(veto.pmt_hash_max(), 3);

    let pmt_hash = |plate, pmt| veto.pmt_hash(veto.pmt_id(0, plate, pmt).unwrap());
    assert_eq!(pmt_hash(0, 0), Some(IdentifierHash::new(0)));
    assert_eq!(pmt_hash(1, 0), Some(IdentifierHash::new(1)));
    assert_eq!(pmt_hash(1, 1), Some(IdentifierHash::new(2)));
    assert_eq!(pmt_hash(0, 1), None);

    let h0 = veto.plate_hash(veto.plate_id(0, 0).unwrap()).unwrap();
    let h1 = veto.plate_hash(veto.plate_id(0, 1).unwrap()).unwrap();
    assert_eq!(veto.next_in_z(h0), Some(h1));
    assert_eq!(veto.prev_in_z(h1), Some(h0));
}

#[test]
fn test_overlapping_regions_are_rejected() {
    let overlapping = TWO_STATIONS.replace(
        "pmt = 0\n",
        "pmt = 0\n\n\
         [[region]]\nsubdet = \"Scintillator\"\npart = \"Veto\"\nstation = 1\nplate = 2\npmt = 0\n",
    );
    let dict = Dictionary::from_str(&overlapping).unwrap();
    let err = CodecTables::build(&dict).unwrap_err();
    assert!(err.to_string().contains("Veto"), "{}", err);
    assert!(matches!(err, IdError::Build { .. }));
}
