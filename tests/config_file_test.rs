//! Configuration files: JSON round trips, partial documents and validation.

use dycore_rs::advection::AdvectionScheme;
use dycore_rs::config::{BuoyancyType, TerrainType};
use dycore_rs::{ConfigError, MoistureModel, SolverConfig, SolverParams};
use std::io::Write;
use tempfile::NamedTempFile;

#[test]
fn test_save_and_reload() {
    let params = SolverParams {
        use_terrain: true,
        terrain_type: TerrainType::Moving,
        no_substepping: true,
        use_gravity: true,
        moisture: MoistureModel::Moist,
        dycore_horiz_adv_type: "Upwind_3rd".to_string(),
        moistscal_vert_adv_type: "WENOZ5".to_string(),
        les_type: "Smagorinsky".to_string(),
        cs: 0.18,
        ..Default::default()
    };

    let file = NamedTempFile::new().unwrap();
    params.save_to_file(file.path()).unwrap();
    let loaded = SolverParams::from_file(file.path()).unwrap();
    assert_eq!(loaded, params);

    let config = SolverConfig::from_params(&loaded).unwrap();
    assert_eq!(config.terrain_type, TerrainType::Moving);
    assert_eq!(config.advection.dycore_horiz, AdvectionScheme::Upwind3rd);
    assert_eq!(config.advection.moistscal_vert, AdvectionScheme::WenoZ5);
}

#[test]
fn test_moving_terrain_with_substeps_from_file() {
    let mut file = NamedTempFile::new().unwrap();
    write!(
        file,
        r#"{{
            "use_terrain": true,
            "terrain_type": "moving",
            "use_lagged_delta_rt": false,
            "n_substeps": 4
        }}"#
    )
    .unwrap();
    let config = SolverConfig::from_params(&SolverParams::from_file(file.path()).unwrap()).unwrap();
    assert!(config.is_moving_terrain());
    assert!(!config.no_substepping && !config.use_lagged_delta_rt);
    assert_eq!(config.n_substeps, 4);
}

#[test]
fn test_partial_document_uses_defaults() {
    let mut file = NamedTempFile::new().unwrap();
    write!(
        file,
        r#"{{
            "moisture": "warm_no_precip",
            "buoyancy_type": 2,
            "n_substeps": 4,
            "dryscal_horiz_adv_type": "WENO5"
        }}"#
    )
    .unwrap();

    let params = SolverParams::from_file(file.path()).unwrap();
    assert_eq!(params.moisture, MoistureModel::WarmNoPrecip);
    assert_eq!(params.n_substeps, 4);
    assert_eq!(params.terrain_type, TerrainType::Static);
    assert!(params.force_stage1_single_substep);

    let config = SolverConfig::from_params(&params).unwrap();
    assert_eq!(config.buoyancy_type, BuoyancyType::PressurePerturbation);
    assert_eq!(config.n_substeps, 4);
    assert_eq!(config.gravity, 0.0);
    assert_eq!(config.advection.dycore_horiz, AdvectionScheme::Centered2nd);
    assert_eq!(config.advection.dryscal_horiz, AdvectionScheme::Weno5);
    assert_eq!(config.advection.moistscal_horiz, AdvectionScheme::Weno3);
}

#[test]
fn test_unreadable_input_is_a_load_error() {
    let missing = std::env::temp_dir().join("dycore-rs-no-such-config.json");
    assert!(matches!(SolverParams::from_file(&missing), Err(ConfigError::Load(_))));

    let mut file = NamedTempFile::new().unwrap();
    write!(file, "{{ \"n_substeps\": \"six\" }}").unwrap();
    assert!(matches!(SolverParams::from_file(file.path()), Err(ConfigError::Load(_))));

    let mut file = NamedTempFile::new().unwrap();
    write!(file, "{{ \"terrain_type\": \"sliding\" }}").unwrap();
    assert!(matches!(SolverParams::from_file(file.path()), Err(ConfigError::Load(_))));
}

#[test]
fn test_rejected_combinations() {
    let weno_dycore = SolverParams {
        dycore_vert_adv_type: "WENO3".to_string(),
        ..Default::default()
    };
    assert!(matches!(
        SolverConfig::from_params(&weno_dycore),
        Err(ConfigError::UnsupportedAdvectionType { .. })
    ));

    let unknown = SolverParams {
        dryscal_horiz_adv_type: "Upwind_7th".to_string(),
        ..Default::default()
    };
    assert!(matches!(
        SolverConfig::from_params(&unknown),
        Err(ConfigError::UnknownAdvectionType { .. })
    ));

    let incompressible = SolverParams {
        incompressible: true,
        ..Default::default()
    };
    assert!(matches!(
        SolverConfig::from_params(&incompressible),
        Err(ConfigError::IncompressibleRequiresNoSubstepping)
    ));

    let lagged = SolverParams {
        use_lagged_delta_rt: false,
        ..Default::default()
    };
    assert!(matches!(
        SolverConfig::from_params(&lagged),
        Err(ConfigError::LaggedDeltaRtRequiresMovingTerrain)
    ));

    let moving_flat = SolverParams {
        terrain_type: TerrainType::Moving,
        ..Default::default()
    };
    assert!(matches!(
        SolverConfig::from_params(&moving_flat),
        Err(ConfigError::Incompatible(_))
    ));

    let buoyancy = SolverParams {
        buoyancy_type: 7,
        ..Default::default()
    };
    assert!(matches!(
        SolverConfig::from_params(&buoyancy),
        Err(ConfigError::InvalidParameter { .. })
    ));
}
