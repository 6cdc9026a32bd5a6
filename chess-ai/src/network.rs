//! 前馈评分网络
//!
//! 每层为 `tanh(W·h + b)`，最后一层输出单个标量。参数只在构造时随机初始化，
//! 引擎内部不做训练。

use rand::Rng;

use crate::error::EvalError;

/// 初始权重的取值范围（均匀分布 ±INIT_SCALE）
const INIT_SCALE: f32 = 0.05;

/// 网络层
#[derive(Debug, Clone)]
pub struct Layer {
    inputs: usize,
    outputs: usize,
    /// 行优先存储，`weights[o * inputs + i]`
    weights: Vec<f32>,
    bias: Vec<f32>,
}

impl Layer {
    /// 随机初始化（偏置为 0）
    pub fn random<R: Rng + ?Sized>(inputs: usize, outputs: usize, rng: &mut R) -> Self {
        let weights = (0..inputs * outputs)
            .map(|_| rng.gen_range(-INIT_SCALE..INIT_SCALE))
            .collect();
        Self {
            inputs,
            outputs,
            weights,
            bias: vec![0.0; outputs],
        }
    }

    /// 从已有参数创建
    pub fn from_parts(
        inputs: usize,
        outputs: usize,
        weights: Vec<f32>,
        bias: Vec<f32>,
    ) -> Result<Self, EvalError> {
        if weights.len() != inputs * outputs || bias.len() != outputs {
            return Err(EvalError::InvalidLayer {
                reason: format!(
                    "{}x{} layer needs {} weights and {} biases, got {} and {}",
                    inputs,
                    outputs,
                    inputs * outputs,
                    outputs,
                    weights.len(),
                    bias.len()
                ),
            });
        }
        Ok(Self {
            inputs,
            outputs,
            weights,
            bias,
        })
    }

    pub fn inputs(&self) -> usize {
        self.inputs
    }

    pub fn outputs(&self) -> usize {
        self.outputs
    }

    fn forward(&self, input: &[f32]) -> Vec<f32> {
        self.weights
            .chunks_exact(self.inputs)
            .zip(&self.bias)
            .map(|(row, b)| {
                let sum: f32 = row.iter().zip(input).map(|(w, x)| w * x).sum();
                (sum + b).tanh()
            })
            .collect()
    }
}

/// 多层前馈网络
#[derive(Debug, Clone)]
pub struct Network {
    layers: Vec<Layer>,
}

impl Network {
    /// 按层宽随机初始化，`sizes` 依次为输入维度、各隐藏层宽度、输出维度
    pub fn random<R: Rng + ?Sized>(sizes: &[usize], rng: &mut R) -> Self {
        let layers = sizes
            .windows(2)
            .map(|pair| Layer::random(pair[0], pair[1], rng))
            .collect();
        Self { layers }
    }

    /// 从已有层创建
    pub fn from_layers(layers: Vec<Layer>) -> Self {
        Self { layers }
    }

    /// 层数
    pub fn depth(&self) -> usize {
        self.layers.len()
    }

    /// 输入维度
    pub fn input_size(&self) -> usize {
        self.layers.first().map_or(0, Layer::inputs)
    }

    /// 前向传播，输出最后一层的唯一标量
    pub fn forward(&self, input: &[f32]) -> Result<f32, EvalError> {
        let mut activation = input.to_vec();

        for (index, layer) in self.layers.iter().enumerate() {
            if layer.inputs == 0 || layer.outputs == 0 {
                return Err(EvalError::InvalidLayer {
                    reason: format!(
                        "layer {} has zero width ({}x{})",
                        index, layer.inputs, layer.outputs
                    ),
                });
            }
            if activation.len() != layer.inputs {
                return Err(EvalError::ShapeMismatch {
                    layer: index,
                    expected: layer.inputs,
                    actual: activation.len(),
                });
            }
            activation = layer.forward(&activation);
            if activation.iter().any(|v| !v.is_finite()) {
                return Err(EvalError::NonFinite { layer: index });
            }
        }

        match activation.as_slice() {
            [score] => Ok(*score),
            other => Err(EvalError::ShapeMismatch {
                layer: self.layers.len(),
                expected: 1,
                actual: other.len(),
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    #[test]
    fn test_forward_is_bounded() {
        let mut rng = ChaCha8Rng::seed_from_u64(7);
        let net = Network::random(&[6, 4, 3, 1], &mut rng);
        assert_eq!(net.depth(), 3);
        assert_eq!(net.input_size(), 6);

        let score = net.forward(&[1.0, -2.0, 3.0, 0.0, 5.0, -7.0]).unwrap();
        assert!((-1.0..=1.0).contains(&score));
    }

    #[test]
    fn test_known_weights() {
        let layer = Layer::from_parts(2, 1, vec![0.5, -0.25], vec![0.1]).unwrap();
        let net = Network::from_layers(vec![layer]);
        let score = net.forward(&[2.0, 4.0]).unwrap();
        assert!((score - 0.1f32.tanh()).abs() < 1e-6);
    }

    #[test]
    fn test_shape_mismatch() {
        let mut rng = ChaCha8Rng::seed_from_u64(7);
        let net = Network::random(&[4, 2, 1], &mut rng);
        assert_eq!(
            net.forward(&[1.0, 2.0]),
            Err(EvalError::ShapeMismatch {
                layer: 0,
                expected: 4,
                actual: 2
            })
        );

        // 最后一层不是单输出
        let wide = Network::random(&[2, 3], &mut rng);
        assert!(matches!(
            wide.forward(&[1.0, 1.0]),
            Err(EvalError::ShapeMismatch { expected: 1, actual: 3, .. })
        ));
    }

    #[test]
    fn test_non_finite() {
        let layer = Layer::from_parts(1, 1, vec![f32::NAN], vec![0.0]).unwrap();
        let net = Network::from_layers(vec![layer]);
        assert_eq!(net.forward(&[1.0]), Err(EvalError::NonFinite { layer: 0 }));
    }

    #[test]
    fn test_zero_width_layer() {
        let mut rng = ChaCha8Rng::seed_from_u64(7);
        let net = Network::random(&[6, 0, 1], &mut rng);
        assert!(matches!(net.forward(&[0.0; 6]), Err(EvalError::InvalidLayer { .. })));

        let net = Network::random(&[0, 1], &mut rng);
        assert!(matches!(net.forward(&[]), Err(EvalError::InvalidLayer { .. })));
    }

    #[test]
    fn test_invalid_parts() {
        assert!(Layer::from_parts(2, 2, vec![0.0; 3], vec![0.0; 2]).is_err());
        assert!(Layer::from_parts(2, 2, vec![0.0; 4], vec![0.0; 1]).is_err());
    }
}
