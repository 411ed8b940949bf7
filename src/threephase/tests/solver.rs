use itertools::Itertools;
use log::info;
use std::time::{Duration, Instant};
use threephase::{
    Alg, FaceletCube, FaceletError, MoveParseError, SolveError, Solver, SolverConfig, init,
};

fn assert_solves(scramble: &str) -> Alg {
    let solution = threephase::solve(scramble).unwrap();
    let cube = FaceletCube::from_alg(&scramble.parse().unwrap());
    let solved = cube.apply_alg(&solution).is_solved();
    assert!(solved, "{scramble}: {solution}");
    info!("{scramble} -> {solution} ({} moves)", solution.len());
    solution
}

#[test_log::test]
fn test_solved_cube() {
    assert!(assert_solves("").is_empty());
    let solved = FaceletCube::SOLVED.to_string();
    assert!(threephase::solution(&solved).unwrap().is_empty());
}

#[test_log::test]
fn test_sexy_move() {
    assert_solves("R U R' U'");
}

#[test_log::test]
fn test_demo_scrambles() {
    for scramble in [
        "Rw U2 Rw U2 Rw U Rw U2 Rw' U Rw U2 Rw' U Rw U",
        "R U F2 D L' B",
        "Rw U Rw'",
        "R U R' U' R U R'",
    ] {
        assert_solves(scramble);
    }
}

#[test_log::test]
fn test_parity_cases() {
    // Both parities at once, and each on its own
    assert_solves("r2 B2 U2 l U2 r' U2 r U2 F2 r F2 l' B2 r2");
    assert_solves("r2 U2 r2 Uw2 r2 Uw2 U2");
    assert_solves("r");
}

#[test_log::test]
fn test_last_two_dedges_are_paired_quickly() {
    init();
    let start = Instant::now();
    assert_solves("Fw R' u2 B l' D f2");
    let elapsed = start.elapsed();
    assert!(elapsed < Duration::from_secs(5), "{elapsed:?}");
}

#[test_log::test]
fn test_facelet_round_trip() {
    let mut rng = fastrand::Rng::with_seed(2024);
    for _ in 0..3 {
        let state = threephase::random_state(&mut rng).unwrap();
        assert_eq!(state.scramble.len(), 80);
        let cube: FaceletCube = state.facelets.parse().unwrap();
        assert!(cube.apply_alg(&state.solution).is_solved());

        let solution = threephase::solution(&state.facelets).unwrap();
        assert!(cube.apply_alg(&solution).is_solved());
        assert_eq!(solution, state.solution);
    }
}

#[test_log::test]
fn test_random_state_is_deterministic() {
    let solver = Solver::with_config(
        init(),
        SolverConfig {
            scramble_length: 30,
            ..SolverConfig::default()
        },
    );
    let [mut rng_a, mut rng_b] = [9, 9].map(fastrand::Rng::with_seed);
    let a = solver.random_state(&mut rng_a).unwrap();
    let b = solver.random_state(&mut rng_b).unwrap();
    assert_eq!(a, b);
    assert_eq!(a.scramble.len(), 30);
}

#[test_log::test]
fn test_solution_display_parses_back() {
    let solution = assert_solves("Lw2 b' R D2 u Fw");
    let reparsed: Alg = solution.to_string().parse().unwrap();
    let cube = FaceletCube::from_alg(&"Lw2 b' R D2 u Fw".parse().unwrap());
    assert!(cube.apply_alg(&reparsed).is_solved());
}

#[test_log::test]
fn test_malformed_inputs() {
    let solved = FaceletCube::SOLVED.to_string();
    assert!(matches!(
        threephase::solution(&solved[..95]),
        Err(SolveError::Facelet(FaceletError::MalformedInput(_)))
    ));
    assert!(matches!(
        threephase::solution(&format!("Q{}", &solved[1..])),
        Err(SolveError::Facelet(FaceletError::MalformedInput(_)))
    ));
    assert!(matches!(
        threephase::solution(&format!("U{}", &solved[..95])),
        Err(SolveError::Facelet(FaceletError::MalformedInput(_)))
    ));
    let malformed = MoveParseError::MalformedMove("X2".to_owned());
    assert_eq!(
        threephase::solve("R U X2"),
        Err(SolveError::MoveParse(malformed))
    );
}

#[test_log::test]
fn test_twisted_corner() {
    let mut chars = FaceletCube::SOLVED.to_string().chars().collect_vec();
    // URF is facelets 15, 16 and 35
    (chars[15], chars[16], chars[35]) = (chars[35], chars[15], chars[16]);
    let text: String = chars.into_iter().collect();
    assert!(matches!(
        threephase::solution(&text),
        Err(SolveError::Facelet(FaceletError::InvalidCube(_)))
    ));
}

#[test_log::test]
fn test_concurrent_solves() {
    let tables = init();
    let scrambles = [
        "R U F2 D L' B",
        "Rw U Rw'",
        "Fw R' u2 B l' D f2",
        "r2 U2 r2 Uw2 r2 Uw2 U2",
    ];
    let solutions = std::thread::scope(|s| {
        let solver = Solver::new(tables);
        scrambles
            .iter()
            .map(|scramble| s.spawn(move || solver.solve(scramble)))
            .collect_vec()
            .into_iter()
            .map(|handle| handle.join().unwrap().unwrap())
            .collect_vec()
    });
    for (scramble, solution) in scrambles.iter().zip(&solutions) {
        let cube = FaceletCube::from_alg(&scramble.parse().unwrap());
        assert!(cube.apply_alg(solution).is_solved());
        assert_eq!(*solution, threephase::solve(scramble).unwrap());
    }
}
