//! End-to-end tests of the shell runtime: synthetic protocol events in,
//! facade state and notifications out.

use std::path::Path;
use std::sync::{Arc, Mutex};

use aurora_core::config::ShellConfig;
use aurora_shell::protocol::events::{GlobalEvent, SurfaceEvent};
use aurora_shell::protocol::types::{SHELL_INTERFACE, SURFACE_FACTORY_INTERFACE};
use aurora_shell::protocol::{CompositorLink, CompositorRequest, SurfaceId};
use aurora_shell::workspaces::WorkspaceEvent;
use aurora_shell::{ShellError, ShellRuntime, WindowState};

/// Records every outbound request instead of talking to a compositor.
#[derive(Default)]
struct RecordingLink {
    requests: Mutex<Vec<CompositorRequest>>,
}

impl RecordingLink {
    fn take(&self) -> Vec<CompositorRequest> {
        let mut requests = self.requests.lock().unwrap();
        std::mem::take(&mut *requests)
    }
}

impl CompositorLink for RecordingLink {
    fn submit(
        &self,
        request: CompositorRequest,
    ) -> Result<(), aurora_shell::protocol::RequestError> {
        self.requests.lock().unwrap().push(request);
        Ok(())
    }
}

fn install_handler(root: &Path, dir: &str, contents: &str) {
    let handler_dir = root.join(dir);
    std::fs::create_dir_all(&handler_dir).unwrap();
    std::fs::write(handler_dir.join("handler.toml"), contents).unwrap();
}

fn test_config(handler_dir: &Path, initial_workspaces: usize) -> ShellConfig {
    let mut config = ShellConfig::default();
    config.handlers.directory = handler_dir.to_path_buf();
    config.workspaces.initial_count = initial_workspaces;
    config
}

fn runtime_with_shell_bound(
    config: ShellConfig,
) -> (ShellRuntime, Arc<RecordingLink>) {
    let link = Arc::new(RecordingLink::default());
    let mut shell = ShellRuntime::new(link.clone(), config);
    shell.observe_global(GlobalEvent::Added {
        name: 1,
        interface: SHELL_INTERFACE.to_string(),
        version: 4,
    });
    shell.observe_global(GlobalEvent::Added {
        name: 2,
        interface: SURFACE_FACTORY_INTERFACE.to_string(),
        version: 3,
    });
    (shell, link)
}

fn map(shell: &mut ShellRuntime, id: u32) -> SurfaceId {
    let surface = SurfaceId::new(id);
    shell.dispatch(SurfaceEvent::Mapped { surface }.into());
    surface
}

#[test]
fn bootstrap_brings_up_workspaces_handlers_and_ready() {
    let dir = tempfile::tempdir().unwrap();
    install_handler(dir.path(), "desktop", "name = \"desktop\"\npriority = 1\n");
    install_handler(dir.path(), "tablet", "name = \"tablet\"\npriority = 5\nwilling = false\n");

    let (mut shell, link) = runtime_with_shell_bound(test_config(dir.path(), 4));
    shell.bootstrap().unwrap();

    assert_eq!(shell.workspace_count(), 4);
    assert_eq!(shell.current_shell().as_deref(), Some("desktop"));

    let requests = link.take();
    assert_eq!(
        requests
            .iter()
            .filter(|r| matches!(r, CompositorRequest::AddWorkspace))
            .count(),
        4
    );
    assert_eq!(requests.last(), Some(&CompositorRequest::DesktopReady));
}

#[test]
fn bootstrap_fails_without_mandatory_shell_capability() {
    let dir = tempfile::tempdir().unwrap();
    install_handler(dir.path(), "desktop", "name = \"desktop\"\n");

    let link = Arc::new(RecordingLink::default());
    let mut shell = ShellRuntime::new(link, test_config(dir.path(), 4));
    // Only the surface factory arrives; the shell interface never does.
    shell.observe_global(GlobalEvent::Added {
        name: 2,
        interface: SURFACE_FACTORY_INTERFACE.to_string(),
        version: 3,
    });

    assert!(matches!(
        shell.bootstrap(),
        Err(ShellError::Registry(_))
    ));
}

#[test]
fn bootstrap_fails_with_no_handler_candidates() {
    let dir = tempfile::tempdir().unwrap();
    let (mut shell, _link) = runtime_with_shell_bound(test_config(dir.path(), 4));
    assert!(matches!(shell.bootstrap(), Err(ShellError::Handler(_))));
}

#[test]
fn workspace_scenario_keeps_indices_contiguous_and_notifies_in_order() {
    let dir = tempfile::tempdir().unwrap();
    install_handler(dir.path(), "desktop", "name = \"desktop\"\n");
    let (mut shell, link) = runtime_with_shell_bound(test_config(dir.path(), 0));
    let mut workspace_events = shell.subscribe_workspaces();

    // Start with 0 workspaces, add 4, assign W1 to index 2, remove 1.
    for _ in 0..4 {
        shell.add_workspace();
    }
    let w1 = map(&mut shell, 101);
    shell.assign_window(w1, 2).unwrap();
    shell.remove_workspace(1).unwrap();

    // W1's workspace shifted down to index 1.
    assert_eq!(shell.window_workspace(w1), Some(1));
    assert_eq!(shell.workspace_count(), 3);
    assert_eq!(shell.workspace_windows(1).unwrap(), vec![w1]);

    let mut observed = Vec::new();
    while let Ok(event) = workspace_events.try_recv() {
        observed.push(event);
    }
    assert_eq!(
        observed,
        vec![
            WorkspaceEvent::Added { index: 0 },
            WorkspaceEvent::Added { index: 1 },
            WorkspaceEvent::Added { index: 2 },
            WorkspaceEvent::Added { index: 3 },
            WorkspaceEvent::WindowAssigned {
                window: w1,
                workspace: 2,
                previous: None
            },
            WorkspaceEvent::Removed {
                index: 1,
                windows: vec![]
            },
        ]
    );

    let requests = link.take();
    assert!(requests.contains(&CompositorRequest::RemoveWorkspace(1)));
}

#[test]
fn out_of_range_workspace_removal_is_typed_and_mutates_nothing() {
    let dir = tempfile::tempdir().unwrap();
    let (mut shell, link) = runtime_with_shell_bound(test_config(dir.path(), 0));
    shell.add_workspace();
    link.take();

    assert!(matches!(
        shell.remove_workspace(9),
        Err(ShellError::Workspace(_))
    ));
    assert_eq!(shell.workspace_count(), 1);
    // The failed removal never reached the compositor.
    assert!(link.take().is_empty());
}

#[test]
fn duplicate_mapped_event_announces_one_window() {
    let dir = tempfile::tempdir().unwrap();
    let (mut shell, _link) = runtime_with_shell_bound(test_config(dir.path(), 0));
    let mut window_events = shell.subscribe_windows();

    let surface = map(&mut shell, 7);
    shell.dispatch(SurfaceEvent::Mapped { surface }.into());

    let mut added = 0;
    while let Ok(event) = window_events.try_recv() {
        if matches!(event, aurora_shell::windows::WindowEvent::Added { .. }) {
            added += 1;
        }
    }
    assert_eq!(added, 1);
    assert_eq!(shell.windows().len(), 1);
}

#[test]
fn activation_is_exclusive_within_a_workspace() {
    let dir = tempfile::tempdir().unwrap();
    let (mut shell, _link) = runtime_with_shell_bound(test_config(dir.path(), 0));
    shell.add_workspace();

    let a = map(&mut shell, 1);
    let b = map(&mut shell, 2);
    shell.assign_window(a, 0).unwrap();
    shell.assign_window(b, 0).unwrap();

    shell.dispatch(SurfaceEvent::Activated { surface: b }.into());
    assert_eq!(shell.window(b).unwrap().state(), WindowState::Active);

    shell.dispatch(SurfaceEvent::Activated { surface: a }.into());
    assert_eq!(shell.window(a).unwrap().state(), WindowState::Active);
    assert_eq!(shell.window(b).unwrap().state(), WindowState::Mapped);

    let active = shell
        .workspace_windows(0)
        .unwrap()
        .into_iter()
        .filter(|id| shell.window(*id).unwrap().is_active())
        .count();
    assert_eq!(active, 1);
}

#[test]
fn activation_in_different_workspaces_can_coexist() {
    let dir = tempfile::tempdir().unwrap();
    let (mut shell, _link) = runtime_with_shell_bound(test_config(dir.path(), 0));
    shell.add_workspace();
    shell.add_workspace();

    let a = map(&mut shell, 1);
    let b = map(&mut shell, 2);
    shell.assign_window(a, 0).unwrap();
    shell.assign_window(b, 1).unwrap();

    shell.dispatch(SurfaceEvent::Activated { surface: a }.into());
    shell.dispatch(SurfaceEvent::Activated { surface: b }.into());

    assert!(shell.window(a).unwrap().is_active());
    assert!(shell.window(b).unwrap().is_active());
}

#[test]
fn destroying_active_child_hands_focus_back_to_parent() {
    let dir = tempfile::tempdir().unwrap();
    let (mut shell, _link) = runtime_with_shell_bound(test_config(dir.path(), 0));
    shell.add_workspace();

    let parent = map(&mut shell, 1);
    let child = map(&mut shell, 2);
    shell.assign_window(parent, 0).unwrap();
    shell.assign_window(child, 0).unwrap();
    shell.dispatch(
        SurfaceEvent::ParentChanged {
            surface: child,
            parent: Some(parent),
        }
        .into(),
    );

    shell.dispatch(SurfaceEvent::Activated { surface: child }.into());
    shell.dispatch(SurfaceEvent::Destroyed { surface: child }.into());

    assert!(shell.window(child).is_none());
    assert_eq!(shell.window_workspace(child), None);
    assert!(shell.window(parent).unwrap().is_active());
}

#[test]
fn destroying_window_whose_parent_is_gone_fails_soft() {
    let dir = tempfile::tempdir().unwrap();
    let (mut shell, _link) = runtime_with_shell_bound(test_config(dir.path(), 0));
    shell.add_workspace();

    let parent = map(&mut shell, 1);
    let child = map(&mut shell, 2);
    shell.assign_window(child, 0).unwrap();
    shell.dispatch(
        SurfaceEvent::ParentChanged {
            surface: child,
            parent: Some(parent),
        }
        .into(),
    );
    shell.dispatch(SurfaceEvent::Activated { surface: child }.into());

    // The parent dies first; the child's stored link now dangles.
    shell.dispatch(SurfaceEvent::Destroyed { surface: parent }.into());
    shell.dispatch(SurfaceEvent::Destroyed { surface: child }.into());

    assert!(shell.window(parent).is_none());
    assert!(shell.window(child).is_none());
    assert_eq!(shell.workspace_windows(0).unwrap(), vec![]);
}

#[test]
fn events_for_destroyed_windows_are_discarded() {
    let dir = tempfile::tempdir().unwrap();
    let (mut shell, _link) = runtime_with_shell_bound(test_config(dir.path(), 0));

    let surface = map(&mut shell, 1);
    shell.dispatch(SurfaceEvent::Destroyed { surface }.into());

    // A straggler event for the dead identity must not crash or
    // resurrect anything.
    shell.dispatch(SurfaceEvent::Minimized { surface }.into());
    shell.dispatch(SurfaceEvent::Activated { surface }.into());
    assert!(shell.window(surface).is_none());
    assert!(shell.windows().is_empty());
}

#[test]
fn handler_reselection_scenario_emits_single_change() {
    let dir = tempfile::tempdir().unwrap();
    install_handler(dir.path(), "a", "name = \"a\"\npriority = 1\nwilling = false\n");
    install_handler(dir.path(), "b", "name = \"b\"\npriority = 5\n");

    let (mut shell, _link) = runtime_with_shell_bound(test_config(dir.path(), 1));
    shell.bootstrap().unwrap();
    assert_eq!(shell.current_shell().as_deref(), Some("b"));

    let mut handler_events = shell.subscribe_handlers();
    shell.set_handler_willing("a", true).unwrap();
    shell.set_handler_priority("a", 0).unwrap();

    assert_eq!(shell.current_shell().as_deref(), Some("a"));
    assert!(matches!(
        handler_events.try_recv(),
        Ok(aurora_shell::handlers::HandlerEvent::CurrentShellChanged { name }) if name == "a"
    ));
    assert!(
        handler_events.try_recv().is_err(),
        "reselection emits exactly one event"
    );
}

#[test]
fn minimize_and_restore_requests_reach_the_compositor() {
    let dir = tempfile::tempdir().unwrap();
    let (shell, link) = runtime_with_shell_bound(test_config(dir.path(), 0));

    shell.minimize_windows();
    shell.restore_windows();
    assert_eq!(
        link.take(),
        vec![
            CompositorRequest::MinimizeWindows,
            CompositorRequest::RestoreWindows
        ]
    );
}

#[test]
fn minimized_state_follows_compositor_reports() {
    let dir = tempfile::tempdir().unwrap();
    let (mut shell, _link) = runtime_with_shell_bound(test_config(dir.path(), 0));

    let surface = map(&mut shell, 1);
    shell.dispatch(SurfaceEvent::Minimized { surface }.into());
    assert!(shell.window(surface).unwrap().is_minimized());

    shell.dispatch(SurfaceEvent::Unminimized { surface }.into());
    assert_eq!(shell.window(surface).unwrap().state(), WindowState::Mapped);
}

#[test]
fn assigning_unknown_window_is_a_typed_failure() {
    let dir = tempfile::tempdir().unwrap();
    let (mut shell, _link) = runtime_with_shell_bound(test_config(dir.path(), 0));
    shell.add_workspace();

    let result = shell.assign_window(SurfaceId::new(99), 0);
    assert!(matches!(result, Err(ShellError::Window(_))));
}
