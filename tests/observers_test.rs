use std::sync::Arc;

use sunsys::types::{matrix_from_rows, vector};
use sunsys::{
    DiscreteSystem, FnContinuousSystem, KalmanFilter, LuenbergerObserver, Matrix, Observer, Rk4,
    SsLinear, SsObserver, StateSpace, Vector,
};

fn position_velocity(ts: f64) -> SsLinear {
    SsLinear::without_feedthrough(
        matrix_from_rows(2, 2, &[1.0, ts, 0.0, 1.0]).unwrap(),
        matrix_from_rows(2, 1, &[0.0, ts]).unwrap(),
        matrix_from_rows(1, 2, &[1.0, 0.0]).unwrap(),
    )
    .unwrap()
}

#[test]
fn test_kalman_tracks_linear_plant() {
    let model = position_velocity(0.1);
    let mut plant = model.clone().with_initial_state(&vector(&[1.0, 0.5])).unwrap();
    let mut kf = KalmanFilter::new(
        &model,
        Matrix::identity(2, 2) * 0.01,
        Matrix::identity(1, 1) * 0.01,
    )
    .unwrap();

    let u = vector(&[0.0]);
    for _ in 0..300 {
        let y = plant.apply(&u).unwrap().clone();
        kf.obs_apply(&u, &y).unwrap();
    }

    let error = kf.state() - plant.state();
    assert!(error.norm() < 1e-3, "estimation error {error}");
    // Covariance stays symmetric
    let p = kf.covariance();
    assert!((p[(0, 1)] - p[(1, 0)]).abs() < 1e-9);
}

#[test]
fn test_kalman_on_discretized_continuous_system() {
    let continuous = FnContinuousSystem::new(
        1,
        1,
        1,
        Arc::new(|x: &Vector, u: &Vector| vector(&[-x[0] + u[0]])),
        Arc::new(|x: &Vector, _u: &Vector| vector(&[x[0]])),
    )
    .with_jacobians(
        Arc::new(|_x: &Vector, _u: &Vector| Matrix::from_element(1, 1, -1.0)),
        Arc::new(|_x: &Vector, _u: &Vector| Matrix::from_element(1, 1, 1.0)),
    );
    let model = Rk4::new(&continuous, 0.01, false).unwrap();
    let mut plant = model.clone();
    plant.set_state(&vector(&[2.0])).unwrap();

    let mut kf = KalmanFilter::new(
        &model,
        Matrix::from_element(1, 1, 0.1),
        Matrix::from_element(1, 1, 0.1),
    )
    .unwrap();

    let u = vector(&[1.0]);
    for _ in 0..300 {
        let y = plant.apply(&u).unwrap().clone();
        // The filter takes [u; y]
        let full = kf.build_full_input(&u, &y).unwrap();
        kf.apply(&full).unwrap();
    }

    assert!((kf.state()[0] - plant.state()[0]).abs() < 1e-3);
    assert!((plant.state()[0] - 1.0).abs() < 0.1);
}

#[test]
fn test_observers_behind_trait_objects() {
    let model = position_velocity(0.1);
    let l = matrix_from_rows(2, 1, &[0.5, 0.1]).unwrap();

    let observers: Vec<Box<dyn Observer>> = vec![
        Box::new(LuenbergerObserver::new(&model, l).unwrap()),
        Box::new(
            KalmanFilter::new(&model, Matrix::identity(2, 2), Matrix::identity(1, 1)).unwrap(),
        ),
    ];

    for observer in &observers {
        assert_eq!(observer.size_real_input(), 1);
        assert_eq!(observer.size_input(), 2);
        assert_eq!(observer.size_state(), 2);
        assert_eq!(observer.size_output(), 1);

        let mut copy = observer.clone();
        let full = copy.build_full_input(&vector(&[1.0]), &vector(&[0.3])).unwrap();
        copy.apply(&full).unwrap();
        // The original is untouched
        assert_eq!(observer.state(), &Vector::zeros(2));
        assert!(copy.apply(&vector(&[1.0])).is_err());
    }
}

#[test]
fn test_ss_observer_passes_measurement_through() {
    // A system whose input already is [u; y]
    let model = SsLinear::without_feedthrough(
        Matrix::from_element(1, 1, 0.5),
        matrix_from_rows(1, 2, &[1.0, 0.5]).unwrap(),
        Matrix::from_element(1, 1, 1.0),
    )
    .unwrap();
    let mut observer = SsObserver::new(&model).unwrap();
    assert_eq!(observer.size_real_input(), 1);

    let y = observer.obs_apply(&vector(&[1.0]), &vector(&[2.0])).unwrap().clone();
    assert_eq!(y, vector(&[2.0]));
    assert_eq!(observer.state(), &vector(&[2.0]));
}
