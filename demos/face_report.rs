use face_stability::murayama::*;
use face_stability::types::*;
use face_stability::{AnalysisConfig, FaceStabilityAnalysis, GroundParameters};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    println!("=== Tunnel Face Stability (Murayama) ===\n");

    let s = "-".repeat(50);

    println!("Test 1: Shallow face, finite cover");
    println!("{}", s);
    shallow_face()?;

    println!("\n");

    println!("Test 2: Parametric sweep of the search angle");
    println!("{}", s);
    angle_sweep()?;

    println!("\n");

    println!("Test 3: Strength reduction trace");
    println!("{}", s);
    reduction_trace()?;

    println!("\n");

    println!("Test 4: Config file");
    println!("{}", s);
    from_config()?;

    Ok(())
}

fn shallow_face() -> Result<(), Box<dyn std::error::Error>> {
    let ground = GroundParameters::from_quantities(
        Length::new::<meter>(10.0),
        20.0,
        Angle::new::<degree>(30.0),
        Pressure::new::<kilopascal>(20.0),
    )?
    .with_overburden_depth(Length::new::<meter>(30.0))?
    .forcing_finite_cover(true);

    let report = FaceStabilityAnalysis::new(AnalysisConfig::new(ground)).run()?;
    println!("{}", report.summary());

    let geometry = &report.result.critical.geometry;
    println!("\nFailure surface (x, y):");
    for point in geometry.failure_surface(7) {
        println!("  ({:7.3}, {:7.3})", point.x, point.y);
    }

    Ok(())
}

fn angle_sweep() -> Result<(), Box<dyn std::error::Error>> {
    let ground = GroundParameters::new(10.0, 20.0, 30.0, 20.0)?;
    let solver = PressureSolver::new(ground, ModelOptions::default());
    let range = SearchRange::from_point_count(20.0, 80.0, 7)?;

    println!("{:>8} {:>10} {:>8}", "θ_d", "P (kPa)", "B (m)");
    for theta in range.angles() {
        match solver.solve(theta)? {
            PressureEvaluation::Valid(result) => println!(
                "{:>8} {:>10.2} {:>8.3}",
                DisplayAngle(from_radians(theta)).to_string(),
                result.support_pressure,
                result.geometry.width
            ),
            PressureEvaluation::InvalidWedge { width, .. } => println!(
                "{:>8} {:>10} {:>8.3}",
                DisplayAngle(from_radians(theta)).to_string(),
                "-",
                width
            ),
        }
    }

    Ok(())
}

fn reduction_trace() -> Result<(), Box<dyn std::error::Error>> {
    let ground = GroundParameters::new(6.0, 18.0, 35.0, 80.0)?;
    let solver = SafetyFactorSolver::new(
        PressureSolver::new(ground, ModelOptions::default()),
        SafetyFactorSettings::default(),
    );
    let result = solver.compute(48f64.to_radians())?;

    println!("{:>8} {:>8} {:>8} {:>10}", "F", "c'", "φ'", "P");
    for point in &result.trace {
        println!(
            "{:>8.4} {:>8.2} {:>8.2} {:>10.2}",
            point.factor, point.cohesion, point.friction_angle_deg, point.support_pressure
        );
    }
    println!(
        "SF = {:.3} ({})",
        result.safety_factor,
        result.stability()
    );

    Ok(())
}

fn from_config() -> Result<(), Box<dyn std::error::Error>> {
    let config = AnalysisConfig::from_toml_str(
        r#"
[ground]
face_height = 8.0
unit_weight = 19.0
friction_angle = 28.0
cohesion = 15.0
overburden = 12.0

[model]
centroid_method = "simplified"
"#,
    )?;

    let report = FaceStabilityAnalysis::new(config).run()?;
    println!("{}", report.summary());
    println!("\nConfig used:\n{}", config.to_toml_string()?);

    Ok(())
}
