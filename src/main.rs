// Selection sandbox - a field of units to click, box select and save to quick slots
use bevy::input::mouse::{AccumulatedMouseMotion, MouseScrollUnit, MouseWheel};
use bevy::prelude::*;
use rand::Rng;

use rts_selection::constants::*;
use rts_selection::prelude::*;

const FIELD_SIZE: f32 = 120.0;
const LOOSE_INFANTRY: usize = 60;
const VEHICLES: usize = 12;
const BUILDINGS: usize = 4;
const ROCKS: usize = 10;
const SQUADS: usize = 3;
const SQUAD_SIZE: usize = 6;

// RTS Camera settings
const CAMERA_SPEED: f32 = 50.0;
const CAMERA_ZOOM_SPEED: f32 = 10.0;
const CAMERA_MIN_HEIGHT: f32 = 20.0;
const CAMERA_MAX_HEIGHT: f32 = 200.0;
const CAMERA_ROTATION_SPEED: f32 = 0.005;

#[derive(Component)]
struct RtsCamera {
    focus_point: Vec3,
    yaw: f32,
    pitch: f32,
    distance: f32,
}

/// Marker for the "clear selection" button
#[derive(Component)]
struct ClearSelectionButton;

fn main() {
    App::new()
        .add_plugins(DefaultPlugins)
        .add_plugins((
            SelectionPlugin::default(),
            SelectionInputPlugin,
            SelectionVisualsPlugin,
        ))
        .add_systems(Startup, (setup_scene, spawn_units, setup_ui, setup_selection_pipeline))
        .add_systems(
            Update,
            (
                rts_camera_movement.before(SelectionSet::Gather),
                clear_selection_button_system
                    .after(SelectionSet::Tick)
                    .before(SelectionSet::Publish),
                log_selection_events.after(SelectionSet::Publish),
            ),
        )
        .run();
}

fn setup_scene(
    mut commands: Commands,
    mut meshes: ResMut<Assets<Mesh>>,
    mut materials: ResMut<Assets<StandardMaterial>>,
) {
    let focus_point = Vec3::ZERO;
    let initial_yaw = 0.0;
    let initial_pitch = -0.9;
    let initial_distance = 110.0;

    commands.spawn((
        Camera3d::default(),
        Transform::from_xyz(0.0, 90.0, 70.0).looking_at(focus_point, Vec3::Y),
        RtsCamera {
            focus_point,
            yaw: initial_yaw,
            pitch: initial_pitch,
            distance: initial_distance,
        },
        SelectionCamera,
    ));

    commands.spawn((
        DirectionalLight {
            illuminance: 10_000.0,
            shadows_enabled: true,
            ..default()
        },
        Transform::from_rotation(Quat::from_euler(EulerRot::XYZ, -0.9, 0.4, 0.0)),
    ));

    commands.spawn((
        Mesh3d(meshes.add(Plane3d::default().mesh().size(FIELD_SIZE * 1.5, FIELD_SIZE * 1.5))),
        MeshMaterial3d(materials.add(Color::srgb(0.25, 0.35, 0.2))),
    ));
}

fn spawn_units(
    mut commands: Commands,
    mut meshes: ResMut<Assets<Mesh>>,
    mut materials: ResMut<Assets<StandardMaterial>>,
) {
    let mut rng = rand::thread_rng();
    let half = FIELD_SIZE * 0.5;
    let mut random_ground = |height: f32| {
        Vec3::new(rng.gen_range(-half..half), height, rng.gen_range(-half..half))
    };

    let infantry_mesh = meshes.add(Sphere::new(0.8));
    let infantry_material = materials.add(Color::srgb(0.7, 0.7, 0.75));
    let vehicle_mesh = meshes.add(Cuboid::new(3.0, 1.5, 4.0));
    let vehicle_material = materials.add(Color::srgb(0.45, 0.5, 0.3));
    let building_mesh = meshes.add(Cuboid::new(8.0, 6.0, 8.0));
    let building_material = materials.add(Color::srgb(0.55, 0.45, 0.35));
    let rock_mesh = meshes.add(Sphere::new(3.0));
    let rock_material = materials.add(Color::srgb(0.4, 0.4, 0.4));

    for _ in 0..LOOSE_INFANTRY {
        commands.spawn((
            Mesh3d(infantry_mesh.clone()),
            MeshMaterial3d(infantry_material.clone()),
            Transform::from_translation(random_ground(0.8)),
            Selectable::new(1.0).with_category(CATEGORY_INFANTRY),
        ));
    }

    for _ in 0..VEHICLES {
        commands.spawn((
            Mesh3d(vehicle_mesh.clone()),
            MeshMaterial3d(vehicle_material.clone()),
            Transform::from_translation(random_ground(0.75)),
            Selectable::new(2.5).with_category(CATEGORY_VEHICLE),
        ));
    }

    for _ in 0..BUILDINGS {
        commands.spawn((
            Mesh3d(building_mesh.clone()),
            MeshMaterial3d(building_material.clone()),
            Transform::from_translation(random_ground(3.0)),
            Selectable::new(5.5).with_category(CATEGORY_BUILDING),
        ));
    }

    // Rocks block pointer rays but can't be selected
    for _ in 0..ROCKS {
        commands.spawn((
            Mesh3d(rock_mesh.clone()),
            MeshMaterial3d(rock_material.clone()),
            Transform::from_translation(random_ground(1.0)),
            SelectionBlocker {
                radius: 3.0,
                category: CATEGORY_BUILDING,
            },
        ));
    }

    // Squads: selecting any member selects the whole squad
    for _ in 0..SQUADS {
        let group = commands.spawn_empty().id();
        let anchor = random_ground(0.8);
        let mut members = Vec::with_capacity(SQUAD_SIZE);
        for i in 0..SQUAD_SIZE {
            let offset = Vec3::new((i % 3) as f32 * 2.5, 0.0, (i / 3) as f32 * 2.5);
            let member = commands
                .spawn((
                    Mesh3d(infantry_mesh.clone()),
                    MeshMaterial3d(infantry_material.clone()),
                    Transform::from_translation(anchor + offset),
                    Selectable::new(1.0).with_category(CATEGORY_INFANTRY).in_group(group),
                ))
                .id();
            members.push(member);
        }
        // Anchored so distance sorting ranks the squad by where it stands
        commands.entity(group).insert((
            Transform::from_translation(anchor),
            Selectable::new(0.0).with_category(CATEGORY_INFANTRY),
            SelectableGroup { members },
        ));
    }

    info!(
        "Spawned {} infantry, {} vehicles, {} buildings and {} squads",
        LOOSE_INFANTRY, VEHICLES, BUILDINGS, SQUADS
    );
}

/// Units win over buildings in a mixed box; the cap keeps the units nearest the field center
fn setup_selection_pipeline(mut store: ResMut<ActiveSelections>) {
    store.pipeline.add_filter(PreferCategoryFilter {
        preferred: CATEGORY_INFANTRY | CATEGORY_VEHICLE,
    });
    store.pipeline.set_sorter(DistanceSorter { origin: Vec3::ZERO });
}

fn setup_ui(mut commands: Commands) {
    commands
        .spawn((
            Button,
            Node {
                position_type: PositionType::Absolute,
                right: Val::Px(12.0),
                bottom: Val::Px(12.0),
                padding: UiRect::axes(Val::Px(12.0), Val::Px(6.0)),
                ..default()
            },
            BackgroundColor(Color::srgba(0.1, 0.1, 0.1, 0.8)),
            ClearSelectionButton,
        ))
        .with_children(|parent| {
            parent.spawn((
                Text::new("Clear selection"),
                TextFont {
                    font_size: 16.0,
                    ..default()
                },
            ));
        });
}

/// System: Clicking the button clears the selection (the selector ignores the click
/// because the pointer is over UI)
fn clear_selection_button_system(
    button_query: Query<&Interaction, (Changed<Interaction>, With<ClearSelectionButton>)>,
    mut store: ResMut<ActiveSelections>,
    mut units: SelectableUnits,
) {
    for interaction in button_query.iter() {
        if *interaction == Interaction::Pressed {
            store.deselect_all(&mut units);
        }
    }
}

fn log_selection_events(
    mut selection_events: EventReader<SelectionChanged>,
    mut hover_events: EventReader<HoverChanged>,
) {
    for event in selection_events.read() {
        info!("Selection now holds {} unit(s)", event.selected.len());
    }
    for event in hover_events.read() {
        if let Some(unit) = event.unit {
            debug!("Hovering {:?}", unit);
        }
    }
}

/// System: WASD pan, right-drag rotate, wheel zoom (left mouse belongs to selection)
fn rts_camera_movement(
    time: Res<Time>,
    keyboard_input: Res<ButtonInput<KeyCode>>,
    mouse_button_input: Res<ButtonInput<MouseButton>>,
    mouse_motion: Res<AccumulatedMouseMotion>,
    mut scroll_events: EventReader<MouseWheel>,
    mut camera_query: Query<(&mut Transform, &mut RtsCamera)>,
) {
    let Ok((mut transform, mut camera)) = camera_query.single_mut() else { return };
    let delta_time = time.delta_secs();

    if mouse_button_input.pressed(MouseButton::Right) {
        camera.yaw -= mouse_motion.delta.x * CAMERA_ROTATION_SPEED;
        camera.pitch = (camera.pitch - mouse_motion.delta.y * CAMERA_ROTATION_SPEED).clamp(-1.5, -0.1);
    }

    let mut movement = Vec3::ZERO;
    if keyboard_input.pressed(KeyCode::KeyW) || keyboard_input.pressed(KeyCode::ArrowUp) {
        movement.z -= 1.0;
    }
    if keyboard_input.pressed(KeyCode::KeyS) || keyboard_input.pressed(KeyCode::ArrowDown) {
        movement.z += 1.0;
    }
    if keyboard_input.pressed(KeyCode::KeyA) || keyboard_input.pressed(KeyCode::ArrowLeft) {
        movement.x -= 1.0;
    }
    if keyboard_input.pressed(KeyCode::KeyD) || keyboard_input.pressed(KeyCode::ArrowRight) {
        movement.x += 1.0;
    }

    // Pan along the ground, relative to camera yaw
    if movement.length() > 0.0 {
        movement = movement.normalize() * CAMERA_SPEED * delta_time;
        let yaw = camera.yaw;
        camera.focus_point += Mat3::from_rotation_y(yaw) * movement;
    }

    for scroll in scroll_events.read() {
        let zoom_delta = match scroll.unit {
            MouseScrollUnit::Line => scroll.y * CAMERA_ZOOM_SPEED,
            MouseScrollUnit::Pixel => scroll.y * CAMERA_ZOOM_SPEED * 0.1,
        };
        camera.distance = (camera.distance - zoom_delta).clamp(CAMERA_MIN_HEIGHT, CAMERA_MAX_HEIGHT);
    }

    let rotation = Quat::from_euler(EulerRot::YXZ, camera.yaw, camera.pitch, 0.0);
    transform.translation = camera.focus_point + rotation * Vec3::new(0.0, 0.0, camera.distance);
    transform.rotation = rotation;
}
