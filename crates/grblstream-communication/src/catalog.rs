//! GRBL error, alarm, and setting code catalog
//! Converts numeric firmware codes to human-readable descriptions

/// Decode a GRBL command error code to a human-readable description
pub fn describe_error(code: u8) -> String {
    match code {
        1 => "G-code words consist of a letter and a value. Letter was not found.".to_string(),
        2 => "Numeric value format is not valid or missing an expected value.".to_string(),
        3 => "Grbl '$' system command was not recognized or supported.".to_string(),
        4 => "Negative value received for an expected positive value.".to_string(),
        5 => "Homing cycle is not enabled via settings.".to_string(),
        6 => "Minimum step pulse time must be greater than 3µs.".to_string(),
        7 => "EEPROM read failed. Reset and restored to default values.".to_string(),
        8 => "Grbl '$' command cannot be used unless Grbl is IDLE. Ensures smooth operation during a job.".to_string(),
        9 => "G-code locked out during alarm or jog state.".to_string(),
        10 => "Soft limits cannot be enabled without homing also enabled.".to_string(),
        11 => "Max characters per line exceeded. Line was not processed and executed.".to_string(),
        12 => "Grbl '$' setting value exceeds the maximum step rate supported.".to_string(),
        13 => "Safety door detected as opened and door state initiated.".to_string(),
        14 => "Build info or startup line exceeded EEPROM line length limit.".to_string(),
        15 => "Jog target exceeds machine travel. Command ignored.".to_string(),
        16 => "Jog command with no '=' or contains prohibited g-code.".to_string(),
        17 => "Laser mode requires PWM output.".to_string(),
        20 => "Unsupported or invalid g-code command found in block.".to_string(),
        21 => "More than one g-code command from same modal group found in block.".to_string(),
        22 => "Feed rate has not yet been set or is undefined.".to_string(),
        23 => "G-code command in block requires an integer value.".to_string(),
        24 => "Two G-code commands that both require the use of the XYZ axis words were detected in the block.".to_string(),
        25 => "A G-code word was repeated in the block.".to_string(),
        26 => "A G-code command implicitly or explicitly requires XYZ axis words in the block, but none were detected.".to_string(),
        27 => "N line number value is not within the valid range of 1 - 9,999,999.".to_string(),
        28 => "A G-code command was sent, but is missing some required P or L value words in the line.".to_string(),
        29 => "Grbl supports six work coordinate systems G54-G59. G59.1, G59.2, and G59.3 are not supported.".to_string(),
        30 => "The G53 G-code command requires either a G0 seek or G1 feed motion mode to be active.".to_string(),
        31 => "There are unused axis words in the block and G80 motion mode cancel is active.".to_string(),
        32 => "A G2 or G3 arc was commanded but there are no XYZ axis words in the selected plane to trace the arc.".to_string(),
        33 => "The motion command has an invalid target. G2, G3, and G38.2 generates this error if the arc is impossible to generate or if the probe target is the current position.".to_string(),
        34 => "A G2 or G3 arc, traced with the radius definition, had a mathematical error when computing the arc geometry.".to_string(),
        35 => "A G2 or G3 arc, traced with the offset definition, is missing the IJK offset word in the selected plane to trace the arc.".to_string(),
        36 => "There are unused, leftover G-code words that aren't used by any command in the block.".to_string(),
        37 => "The G43.1 dynamic tool length offset command cannot apply an offset to an axis other than its configured axis.".to_string(),
        38 => "Tool number greater than max supported value.".to_string(),
        _ => format!("Unknown error code: {}", code),
    }
}

/// Decode a GRBL alarm code to a human-readable description
pub fn describe_alarm(code: u8) -> String {
    match code {
        1 => "Hard limit triggered. Machine position is likely lost due to sudden and immediate halt. Re-homing is highly recommended.".to_string(),
        2 => "Soft limit: G-code motion target exceeds machine travel. Machine position safely retained. Alarm may be unlocked.".to_string(),
        3 => "Reset while in motion. Grbl cannot guarantee position. Lost steps are likely. Re-homing is highly recommended.".to_string(),
        4 => "Probe fail. The probe is not in the expected initial state before starting probe cycle, where G38.2 and G38.3 is not triggered and G38.4 and G38.5 is triggered.".to_string(),
        5 => "Probe fail. Probe did not contact the workpiece within the programmed travel for G38.2 and G38.4.".to_string(),
        6 => "Homing fail. Reset during active homing cycle.".to_string(),
        7 => "Homing fail. Safety door was opened during active homing cycle.".to_string(),
        8 => "Homing fail. Cycle failed to clear limit switch when pulling off. Try increasing pull-off setting or check wiring.".to_string(),
        9 => "Homing fail. Could not find limit switch within search distance. Defined as 1.5 * max_travel on search and 5 * pulloff on locate phases.".to_string(),
        _ => format!("Unknown alarm code: {}", code),
    }
}

/// Decode a GRBL `$` setting number to its name and unit
pub fn describe_setting(number: u16) -> String {
    match number {
        0 => "Step pulse time, microseconds".to_string(),
        1 => "Step idle delay, milliseconds".to_string(),
        2 => "Step pulse invert, mask".to_string(),
        3 => "Step direction invert, mask".to_string(),
        4 => "Invert step enable pin, boolean".to_string(),
        5 => "Invert limit pins, boolean".to_string(),
        6 => "Invert probe pin, boolean".to_string(),
        10 => "Status report options, mask".to_string(),
        11 => "Junction deviation, millimeters".to_string(),
        12 => "Arc tolerance, millimeters".to_string(),
        13 => "Report in inches, boolean".to_string(),
        20 => "Soft limits enable, boolean".to_string(),
        21 => "Hard limits enable, boolean".to_string(),
        22 => "Homing cycle enable, boolean".to_string(),
        23 => "Homing direction invert, mask".to_string(),
        24 => "Homing locate feed rate, mm/min".to_string(),
        25 => "Homing search seek rate, mm/min".to_string(),
        26 => "Homing switch debounce delay, milliseconds".to_string(),
        27 => "Homing switch pull-off distance, millimeters".to_string(),
        30 => "Maximum spindle speed, RPM".to_string(),
        31 => "Minimum spindle speed, RPM".to_string(),
        32 => "Laser-mode enable, boolean".to_string(),
        100 => "X-axis steps per millimeter".to_string(),
        101 => "Y-axis steps per millimeter".to_string(),
        102 => "Z-axis steps per millimeter".to_string(),
        110 => "X-axis maximum rate, mm/min".to_string(),
        111 => "Y-axis maximum rate, mm/min".to_string(),
        112 => "Z-axis maximum rate, mm/min".to_string(),
        120 => "X-axis acceleration, mm/sec^2".to_string(),
        121 => "Y-axis acceleration, mm/sec^2".to_string(),
        122 => "Z-axis acceleration, mm/sec^2".to_string(),
        130 => "X-axis maximum travel, millimeters".to_string(),
        131 => "Y-axis maximum travel, millimeters".to_string(),
        132 => "Z-axis maximum travel, millimeters".to_string(),
        _ => format!("Unknown setting: ${}", number),
    }
}
