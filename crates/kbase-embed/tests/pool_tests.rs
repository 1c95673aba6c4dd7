use candle_core::{Device, Tensor};
use kbase_embed::masked_mean_l2;

#[test]
fn masked_mean_l2_skips_padding() {
    let dev = Device::Cpu;
    // Batch of two, two tokens each, hidden dim 4; the first row's second token is padding.
    let h = Tensor::from_slice(&[1.0f32, 2.0, 3.0, 4.0,
                                 5.0, 6.0, 7.0, 8.0,
                                 1.0, 0.0, 0.0, 0.0,
                                 3.0, 0.0, 0.0, 0.0],
                               (2, 2, 4), &dev).unwrap();
    let mask = Tensor::from_slice(&[1u32, 0, 1, 1], (2, 2), &dev).unwrap();
    let out: Vec<Vec<f32>> = masked_mean_l2(&h, &mask).unwrap().to_vec2().unwrap();

    let norm: f32 = (1.0f32 + 4.0 + 9.0 + 16.0).sqrt();
    let expected = [1.0 / norm, 2.0 / norm, 3.0 / norm, 4.0 / norm];
    for (a, b) in out[0].iter().cloned().zip(expected) {
        assert!((a - b).abs() < 1e-5, "a={} b={}", a, b);
    }
    // mean of [1,0,0,0] and [3,0,0,0] is [2,0,0,0] -> unit x axis
    assert!((out[1][0] - 1.0).abs() < 1e-5);
    assert!(out[1][1..].iter().all(|x| x.abs() < 1e-6));
}

#[test]
fn masked_mean_l2_rejects_mismatched_mask() {
    let dev = Device::Cpu;
    let h = Tensor::zeros((1, 3, 2), candle_core::DType::F32, &dev).unwrap();
    let mask = Tensor::ones((1, 2), candle_core::DType::U32, &dev).unwrap();
    assert!(masked_mean_l2(&h, &mask).is_err());
}
