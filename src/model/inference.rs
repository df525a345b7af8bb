// Copyright (c) 2026 bad-antics
// Licensed under the MIT License. See LICENSE file in the project root.
// https://github.com/bad-antics/nemi-rs

//! Placeholder inference model descriptor.
//!
//! The model is built and carried in state but never run on input.

use serde::{Deserialize, Serialize};

use crate::error::{NemiError, Result};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Activation {
    Relu,
    Softmax,
}

/// One layer of a sequential model
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Layer {
    Conv2d { filters: usize, kernel_size: usize, activation: Activation },
    MaxPool2d { pool_size: usize },
    Flatten,
    Dense { units: usize, activation: Activation },
}

/// Tensor shape flowing between layers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Shape {
    Image { height: usize, width: usize, channels: usize },
    Vector(usize),
}

/// A built sequential model
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InferenceModel {
    pub name: String,
    pub input: Shape,
    pub layers: Vec<Layer>,
    pub output: Shape,
    pub parameter_count: usize,
}

impl InferenceModel {
    /// Small defect classifier over 224x224 RGB frames
    pub fn defect_classifier() -> Result<Self> {
        Self::build(
            "defect-classifier",
            Shape::Image { height: 224, width: 224, channels: 3 },
            vec![
                Layer::Conv2d { filters: 32, kernel_size: 3, activation: Activation::Relu },
                Layer::MaxPool2d { pool_size: 2 },
                Layer::Conv2d { filters: 64, kernel_size: 3, activation: Activation::Relu },
                Layer::MaxPool2d { pool_size: 2 },
                Layer::Flatten,
                Layer::Dense { units: 64, activation: Activation::Relu },
                Layer::Dense { units: 10, activation: Activation::Softmax },
            ],
        )
    }

    /// Propagate shapes through `layers`, failing on any incompatible layer
    pub fn build(name: &str, input: Shape, layers: Vec<Layer>) -> Result<Self> {
        let mut shape = input;
        let mut parameter_count = 0usize;

        for (index, layer) in layers.iter().enumerate() {
            let (next, params) = propagate(shape, layer)
                .ok_or_else(|| NemiError::ModelInit(format!("layer {} ({:?}) rejects input {:?}", index, layer, shape)))?;
            shape = next;
            parameter_count += params;
        }

        Ok(Self {
            name: name.to_string(),
            input,
            layers,
            output: shape,
            parameter_count,
        })
    }
}

fn propagate(shape: Shape, layer: &Layer) -> Option<(Shape, usize)> {
    match (shape, layer) {
        (Shape::Image { height, width, channels }, Layer::Conv2d { filters, kernel_size, .. }) => {
            if *filters == 0 || *kernel_size == 0 || height < *kernel_size || width < *kernel_size {
                return None;
            }
            let params = kernel_size * kernel_size * channels * filters + filters;
            Some((
                Shape::Image {
                    height: height - kernel_size + 1,
                    width: width - kernel_size + 1,
                    channels: *filters,
                },
                params,
            ))
        }
        (Shape::Image { height, width, channels }, Layer::MaxPool2d { pool_size }) => {
            if *pool_size == 0 || height < *pool_size || width < *pool_size {
                return None;
            }
            Some((
                Shape::Image { height: height / pool_size, width: width / pool_size, channels },
                0,
            ))
        }
        (Shape::Image { height, width, channels }, Layer::Flatten) => {
            Some((Shape::Vector(height * width * channels), 0))
        }
        (Shape::Vector(n), Layer::Dense { units, .. }) if *units > 0 => {
            Some((Shape::Vector(*units), n * units + units))
        }
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defect_classifier_shapes() {
        let model = InferenceModel::defect_classifier().unwrap();
        assert_eq!(model.output, Shape::Vector(10));
        assert_eq!(model.layers.len(), 7);
        // 896 + 18_496 + 11_944_000 + 650
        assert_eq!(model.parameter_count, 11_964_042);
    }

    #[test]
    fn test_dense_before_flatten_is_rejected() {
        let err = InferenceModel::build(
            "broken",
            Shape::Image { height: 8, width: 8, channels: 1 },
            vec![Layer::Dense { units: 4, activation: Activation::Relu }],
        )
        .unwrap_err();
        assert!(matches!(err, NemiError::ModelInit(_)));
    }
}
