//! Sample rule and catalog files.
//!
//! Line numbers referenced by tests are listed next to each constant.

/// A small `lines` style file.
///
/// Blocks: 4 (`0x01`), 5-6 (`0x01`), 8-10 (`0x02`), 11 (`0x03`).
pub const RULES: &str = "\
# Lines style
# roads

highway=motorway [0x01 road_class=4 road_speed=7 resolution 16]
highway=motorway_link
    [0x01 road_class=3 road_speed=6 resolution 20]

highway=trunk & oneway=yes
    & surface=paved
    [0x02 road_class=4 road_speed=6 resolution 18]
highway=primary [0x03 road_class=3 road_speed=5 resolution 20]
";

/// A catalog with four line records.
///
/// Records start on lines 6 (`0x01`), 13 (`0x02`), 18 (`0x03`) and
/// 23 (`0x04`, no rule).
pub const CATALOG: &str = "\
[_id]
FID=20011
ProductCode=1
[end]

[_line]
Type=0x01
UseOrientation=Y
LineWidth=4
String1=0x04,Motorway
[end]

[_line]
Type=0x02
String1=0x04,Trunk
[end]

[_line]
Type=0x03
String1=0x04,Primary
[end]

[_line]
Type=0x04
String1=0x04,Secondary
[end]
";
