//! Integration tests for Keystate Tracker
//!
//! These tests exercise the public pipeline: catalog search, single-device
//! selection, the read loop and the printing monitor, all against scripted
//! devices.

use keystate_tracker::config::{Config, MonitorConfig};
use keystate_tracker::keyboard::event::EV_REL;
use keystate_tracker::keyboard::{
    ActiveKeys, DeviceCatalog, DeviceInfo, InputDeviceSource, KeyState, KeyStateEngine, LoopExit,
    SearchCriteria,
};
use keystate_tracker::monitor::{select_single_device, KeyMonitor, SelectError};
use keystate_tracker::testing::{
    key_down, key_hold, key_up, raw, syn_report, tap, ScriptedDevice, ScriptedEnumerator,
};

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn catalog_with(device: ScriptedDevice) -> DeviceCatalog<ScriptedEnumerator> {
    DeviceCatalog::new(
        ScriptedEnumerator::new()
            .with_device(ScriptedDevice::mouse("/dev/input/event2", "Logitech Mouse"))
            .with_unopenable("/dev/input/event3")
            .with_device(device)
            .with_device(ScriptedDevice::keyboard("/dev/input/event0", "Power Button")),
    )
}

type Seen = Vec<(String, KeyState, ActiveKeys)>;

fn run_recording(device: &mut ScriptedDevice) -> (LoopExit, Seen) {
    let mut seen = Seen::new();
    let exit = KeyStateEngine::new()
        .run_read_loop(
            device,
            Some(|name: &str, state: KeyState, keys: &ActiveKeys| {
                seen.push((name.to_string(), state, keys.clone()));
                Ok(true)
            }),
        )
        .expect("read loop failed");
    (exit, seen)
}

// ---------------------------------------------------------------------------
// Device selection
// ---------------------------------------------------------------------------

#[test]
fn search_then_select_single_keyboard() {
    let catalog = catalog_with(ScriptedDevice::keyboard("/dev/input/event5", "Foo Bar Keyboard"));
    let criteria = SearchCriteria::new(["Bar", "Foo"]);

    let devices = catalog.search_devices(&criteria).unwrap();
    let device = select_single_device(devices, &criteria).unwrap();

    assert_eq!(device.name(), "Foo Bar Keyboard");
    assert_eq!(
        DeviceInfo::from_source(&device).to_string(),
        "device /dev/input/event5, name \"Foo Bar Keyboard\", phys \"\""
    );
}

#[test]
fn empty_search_is_ambiguous_when_several_keyboards_exist() {
    let catalog = catalog_with(ScriptedDevice::keyboard("/dev/input/event5", "Foo Keyboard"));
    let criteria = SearchCriteria::any();

    let devices = catalog.search_devices(&criteria).unwrap();
    assert_eq!(devices.len(), 2);

    let err = select_single_device(devices, &criteria).unwrap_err();
    assert_eq!(
        err,
        SelectError::Ambiguous(vec!["Foo Keyboard".into(), "Power Button".into()])
    );
}

#[test]
fn mouse_is_never_selected_by_name() {
    let catalog = catalog_with(ScriptedDevice::keyboard("/dev/input/event5", "Foo Keyboard"));
    let criteria = SearchCriteria::new(["Logitech"]);

    let devices = catalog.search_devices(&criteria).unwrap();
    let err = select_single_device(devices, &criteria).unwrap_err();
    assert_eq!(err.to_string(), "no such device: [\"Logitech\"]");
}

// ---------------------------------------------------------------------------
// Read loop
// ---------------------------------------------------------------------------

#[test]
fn hold_scenario_reports_counter_before_release() {
    let mut device = ScriptedDevice::keyboard("/dev/input/event5", "kbd").with_events([
        key_down(30),
        syn_report(),
        key_hold(30),
        syn_report(),
        key_hold(30),
        syn_report(),
        key_up(30),
        syn_report(),
    ]);

    let (exit, seen) = run_recording(&mut device);

    assert_eq!(exit, LoopExit::EndOfStream);
    let states: Vec<KeyState> = seen.iter().map(|(_, s, _)| *s).collect();
    assert_eq!(
        states,
        vec![KeyState::Down, KeyState::Hold, KeyState::Hold, KeyState::Up]
    );
    assert_eq!(seen[2].2.get("KEY_A"), Some(&3));
    assert!(seen[3].2.is_empty());
}

#[test]
fn pointer_motion_between_keys_is_invisible() {
    let mut device = ScriptedDevice::keyboard("/dev/input/event5", "kbd").with_events([
        key_down(44),
        raw(EV_REL, 0, -3),
        raw(EV_REL, 1, 7),
        key_up(44),
    ]);

    let (_, seen) = run_recording(&mut device);

    let names: Vec<&str> = seen.iter().map(|(n, _, _)| n.as_str()).collect();
    assert_eq!(names, vec!["KEY_Z", "KEY_Z"]);
}

#[test]
fn disjoint_presses_leave_unreleased_keys_active() {
    let mut events = Vec::new();
    events.extend(tap(16));
    events.push(key_down(17));
    events.push(key_down(18));
    events.extend(tap(19));
    events.push(key_up(17));
    let mut device = ScriptedDevice::keyboard("/dev/input/event5", "kbd").with_events(events);

    let mut engine = KeyStateEngine::new();
    engine
        .run_read_loop(
            &mut device,
            Some(|_: &str, _: KeyState, _: &ActiveKeys| Ok(true)),
        )
        .unwrap();

    let held: Vec<&str> = engine.active_keys().keys().map(String::as_str).collect();
    assert_eq!(held, vec!["KEY_E"]);
}

#[test]
fn stop_on_second_callback_leaves_rest_unread() {
    let mut device = ScriptedDevice::keyboard("/dev/input/event5", "kbd").with_events([
        key_down(30),
        key_down(31),
        key_up(31),
        key_up(30),
    ]);
    let mut calls = 0;

    let exit = KeyStateEngine::new()
        .run_read_loop(
            &mut device,
            Some(|_: &str, _: KeyState, _: &ActiveKeys| {
                calls += 1;
                Ok(calls != 2)
            }),
        )
        .unwrap();

    assert_eq!(exit, LoopExit::Stopped);
    assert_eq!(calls, 2);
    // Still owned here; dropping it is the caller's job
    assert_eq!(device.remaining(), 2);
}

// ---------------------------------------------------------------------------
// Monitor on top of the loop
// ---------------------------------------------------------------------------

#[test]
fn monitor_prints_and_exits_on_long_press() {
    let mut events = vec![key_down(30), key_up(30), key_down(31)];
    events.extend(std::iter::repeat(key_hold(31)).take(12));
    events.push(key_down(32));
    let mut device = ScriptedDevice::keyboard("/dev/input/event5", "kbd").with_events(events);

    let mut monitor = KeyMonitor::new(Vec::new(), &MonitorConfig::default());
    let exit = KeyStateEngine::new()
        .run_read_loop(
            &mut device,
            Some(|name: &str, state: KeyState, keys: &ActiveKeys| {
                monitor.on_key_event(name, state, keys)
            }),
        )
        .unwrap();

    assert_eq!(exit, LoopExit::Stopped);
    // KEY_S reaches 11 on its tenth repeat; two repeats and KEY_D stay unread
    assert_eq!(device.remaining(), 3);

    let out = String::from_utf8(monitor.into_inner()).unwrap();
    let lines: Vec<&str> = out.lines().collect();
    assert_eq!(
        lines,
        vec![
            "KEY_A:down  {KEY_A: 1}",
            "KEY_A:up  {}",
            "KEY_S:down  {KEY_S: 1}",
            "Bye !",
        ]
    );
}

#[test]
fn monitor_with_repeat_prints_holds() {
    let mut device = ScriptedDevice::keyboard("/dev/input/event5", "kbd")
        .with_events([key_down(30), key_hold(30), key_up(30)]);

    let config = Config::default();
    let mut monitor = KeyMonitor::new(Vec::new(), &config.monitor).with_repeat(true);
    KeyStateEngine::new()
        .run_read_loop(
            &mut device,
            Some(|name: &str, state: KeyState, keys: &ActiveKeys| {
                monitor.on_key_event(name, state, keys)
            }),
        )
        .unwrap();

    let out = String::from_utf8(monitor.into_inner()).unwrap();
    assert_eq!(
        out,
        "KEY_A:down  {KEY_A: 1}\nKEY_A:hold  {KEY_A: 2}\nKEY_A:up  {}\n"
    );
}
