use anyhow::{Result, ensure};
use candle_core::{DType, Tensor};

/// Mean of the token states selected by `attention_mask`, L2 normalized.
///
/// `hidden` is `[B, T, H]`, `attention_mask` is `[B, T]` of any numeric
/// dtype; the result is `[B, H]`.
pub fn masked_mean_l2(hidden: &Tensor, attention_mask: &Tensor) -> Result<Tensor> {
    let (batch, seq, hidden_dim) = hidden.dims3()?;
    ensure!(attention_mask.dims() == [batch, seq], "attention mask shape {:?} does not match hidden {:?}", attention_mask.dims(), hidden.dims());

    let mask = attention_mask.to_device(hidden.device())?.to_dtype(hidden.dtype())?;
    let masked = hidden.broadcast_mul(&mask.unsqueeze(2)?)?;
    let sum = masked.sum(1)?;
    // Clamp so an all-padding row yields zeros instead of NaN.
    let lengths = mask.sum_keepdim(1)?.clamp(1f64, f64::MAX)?;
    let mean = sum.broadcast_div(&lengths)?;
    let eps = match hidden.dtype() { DType::F16 | DType::BF16 => 1e-6f64, _ => 1e-12f64 };
    let norm = (mean.sqr()?.sum_keepdim(1)?.sqrt()? + eps)?;
    let normalized = mean.broadcast_div(&norm)?;
    ensure!(normalized.dims() == [batch, hidden_dim], "pooled shape {:?}", normalized.dims());
    Ok(normalized)
}
