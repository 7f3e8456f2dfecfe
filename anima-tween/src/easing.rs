//! # Easing 模块
//!
//! 缓动函数库，把线性进度重新映射为感知进度。
//!
//! 每个曲线族只给出 In 形式的闭式公式，其余三种形式由组合规则推导：
//! - `Out(t) = 1 - In(1 - t)`
//! - `InOut`：前半段是缩放到 [0, 0.5] 的 In，后半段是缩放到 [0.5, 1] 的 Out
//! - `OutIn`：与 `InOut` 镜像，前半段 Out、后半段 In
//!
//! 所有函数无状态，可以任意顺序、任意线程调用。

use std::f64::consts::PI;

use serde::{Deserialize, Serialize};

/// 缓动曲线族
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EasingFamily {
    Linear,
    Sine,
    Quad,
    Cubic,
    Quart,
    Quint,
    Expo,
    Circ,
    Back,
    Elastic,
    Bounce,
}

/// 缓动形式
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EasingMode {
    /// 缓入（先慢后快）
    In,
    /// 缓出（先快后慢）
    Out,
    /// 缓入缓出（两头慢中间快）
    InOut,
    /// 缓出缓入（两头快中间慢）
    OutIn,
}

macro_rules! easing_table {
    ($($(#[$meta:meta])* $name:ident => ($family:ident, $mode:ident)),* $(,)?) => {
        /// 缓动函数类型
        ///
        /// 序列化时使用变体名（例如 `"InOutSine"`）。
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
        pub enum Easing {
            /// 线性（匀速）
            #[default]
            Linear,
            $($(#[$meta])* $name,)*
        }

        impl Easing {
            /// 全部缓动曲线
            pub const ALL: &'static [Easing] = &[Easing::Linear, $(Easing::$name,)*];

            /// 曲线族与形式
            pub fn parts(self) -> (EasingFamily, EasingMode) {
                match self {
                    Easing::Linear => (EasingFamily::Linear, EasingMode::In),
                    $(Easing::$name => (EasingFamily::$family, EasingMode::$mode),)*
                }
            }
        }
    };
}

easing_table! {
    /// 正弦缓入
    InSine => (Sine, In),
    /// 正弦缓出
    OutSine => (Sine, Out),
    /// 正弦缓入缓出
    InOutSine => (Sine, InOut),
    /// 正弦缓出缓入
    OutInSine => (Sine, OutIn),
    /// 二次缓入
    InQuad => (Quad, In),
    /// 二次缓出
    OutQuad => (Quad, Out),
    /// 二次缓入缓出
    InOutQuad => (Quad, InOut),
    /// 二次缓出缓入
    OutInQuad => (Quad, OutIn),
    /// 三次缓入
    InCubic => (Cubic, In),
    /// 三次缓出
    OutCubic => (Cubic, Out),
    /// 三次缓入缓出
    InOutCubic => (Cubic, InOut),
    /// 三次缓出缓入
    OutInCubic => (Cubic, OutIn),
    /// 四次缓入
    InQuart => (Quart, In),
    /// 四次缓出
    OutQuart => (Quart, Out),
    /// 四次缓入缓出
    InOutQuart => (Quart, InOut),
    /// 四次缓出缓入
    OutInQuart => (Quart, OutIn),
    /// 五次缓入
    InQuint => (Quint, In),
    /// 五次缓出
    OutQuint => (Quint, Out),
    /// 五次缓入缓出
    InOutQuint => (Quint, InOut),
    /// 五次缓出缓入
    OutInQuint => (Quint, OutIn),
    /// 指数缓入
    InExpo => (Expo, In),
    /// 指数缓出
    OutExpo => (Expo, Out),
    /// 指数缓入缓出
    InOutExpo => (Expo, InOut),
    /// 指数缓出缓入
    OutInExpo => (Expo, OutIn),
    /// 圆形缓入
    InCirc => (Circ, In),
    /// 圆形缓出
    OutCirc => (Circ, Out),
    /// 圆形缓入缓出
    InOutCirc => (Circ, InOut),
    /// 圆形缓出缓入
    OutInCirc => (Circ, OutIn),
    /// 回退缓入（会短暂低于 0）
    InBack => (Back, In),
    /// 回退缓出（会短暂超过 1）
    OutBack => (Back, Out),
    /// 回退缓入缓出
    InOutBack => (Back, InOut),
    /// 回退缓出缓入
    OutInBack => (Back, OutIn),
    /// 弹性缓入
    InElastic => (Elastic, In),
    /// 弹性缓出
    OutElastic => (Elastic, Out),
    /// 弹性缓入缓出
    InOutElastic => (Elastic, InOut),
    /// 弹性缓出缓入
    OutInElastic => (Elastic, OutIn),
    /// 弹跳缓入
    InBounce => (Bounce, In),
    /// 弹跳缓出
    OutBounce => (Bounce, Out),
    /// 弹跳缓入缓出
    InOutBounce => (Bounce, InOut),
    /// 弹跳缓出缓入
    OutInBounce => (Bounce, OutIn),
}

impl Easing {
    /// 计算缓动值
    ///
    /// # 参数
    /// - `t`: 时间进度，超出 [0, 1] 会被限制（NaN 视为 0）
    ///
    /// # 返回
    /// 缓动后的进度。`apply(0) == 0`、`apply(1) == 1` 精确成立；
    /// Back / Elastic 族在区间内部可能超出 [0, 1]。
    pub fn apply(self, t: f64) -> f64 {
        if t.is_nan() || t <= 0.0 {
            return 0.0;
        }
        if t >= 1.0 {
            return 1.0;
        }

        let (family, mode) = self.parts();
        match mode {
            EasingMode::In => ease_in(family, t),
            EasingMode::Out => ease_out(family, t),
            EasingMode::InOut => {
                if t < 0.5 {
                    ease_in(family, 2.0 * t) / 2.0
                } else {
                    0.5 + ease_out(family, 2.0 * t - 1.0) / 2.0
                }
            }
            EasingMode::OutIn => {
                if t < 0.5 {
                    ease_out(family, 2.0 * t) / 2.0
                } else {
                    0.5 + ease_in(family, 2.0 * t - 1.0) / 2.0
                }
            }
        }
    }
}

/// 缓出：`1 - In(1 - t)`
fn ease_out(family: EasingFamily, t: f64) -> f64 {
    1.0 - ease_in(family, 1.0 - t)
}

/// 各曲线族的 In 形式
///
/// 端点显式处理：Expo / Elastic 的原始公式在 0、1 处不精确。
fn ease_in(family: EasingFamily, t: f64) -> f64 {
    if t <= 0.0 {
        return 0.0;
    }
    if t >= 1.0 {
        return 1.0;
    }

    match family {
        EasingFamily::Linear => t,
        EasingFamily::Sine => 1.0 - (t * PI / 2.0).cos(),
        EasingFamily::Quad => t * t,
        EasingFamily::Cubic => t * t * t,
        EasingFamily::Quart => t.powi(4),
        EasingFamily::Quint => t.powi(5),
        EasingFamily::Expo => 2.0_f64.powf(10.0 * t - 10.0),
        EasingFamily::Circ => 1.0 - (1.0 - t * t).sqrt(),
        EasingFamily::Back => {
            let c1 = 1.70158;
            let c3 = c1 + 1.0;
            c3 * t * t * t - c1 * t * t
        }
        EasingFamily::Elastic => {
            let c4 = (2.0 * PI) / 3.0;
            -(2.0_f64.powf(10.0 * t - 10.0)) * ((t * 10.0 - 10.75) * c4).sin()
        }
        EasingFamily::Bounce => 1.0 - bounce(1.0 - t),
    }
}

/// 弹跳缓出的分段抛物线
fn bounce(t: f64) -> f64 {
    let n1 = 7.5625;
    let d1 = 2.75;

    if t < 1.0 / d1 {
        n1 * t * t
    } else if t < 2.0 / d1 {
        let t = t - 1.5 / d1;
        n1 * t * t + 0.75
    } else if t < 2.5 / d1 {
        let t = t - 2.25 / d1;
        n1 * t * t + 0.9375
    } else {
        let t = t - 2.625 / d1;
        n1 * t * t + 0.984375
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const EPS: f64 = 1e-9;

    #[test]
    fn test_curve_count() {
        assert_eq!(Easing::ALL.len(), 41);
    }

    #[test]
    fn test_linear() {
        let easing = Easing::Linear;
        assert_eq!(easing.apply(0.0), 0.0);
        assert_eq!(easing.apply(0.5), 0.5);
        assert_eq!(easing.apply(1.0), 1.0);
    }

    #[test]
    fn test_exact_endpoints() {
        for easing in Easing::ALL {
            assert_eq!(easing.apply(0.0), 0.0, "{easing:?} at 0");
            assert_eq!(easing.apply(1.0), 1.0, "{easing:?} at 1");
        }
    }

    #[test]
    fn test_clamp() {
        let easing = Easing::Linear;
        // 超出范围应该被限制
        assert_eq!(easing.apply(-0.5), 0.0);
        assert_eq!(easing.apply(1.5), 1.0);
        assert_eq!(easing.apply(f64::NAN), 0.0);
    }

    #[test]
    fn test_out_mirrors_in() {
        let pairs = [
            (Easing::InSine, Easing::OutSine),
            (Easing::InQuad, Easing::OutQuad),
            (Easing::InCubic, Easing::OutCubic),
            (Easing::InQuart, Easing::OutQuart),
            (Easing::InQuint, Easing::OutQuint),
            (Easing::InExpo, Easing::OutExpo),
            (Easing::InCirc, Easing::OutCirc),
            (Easing::InBack, Easing::OutBack),
            (Easing::InElastic, Easing::OutElastic),
            (Easing::InBounce, Easing::OutBounce),
        ];
        for (ease_in, ease_out) in pairs {
            for i in 1..20 {
                let t = i as f64 / 20.0;
                let expected = 1.0 - ease_in.apply(1.0 - t);
                assert!(
                    (ease_out.apply(t) - expected).abs() < EPS,
                    "{ease_out:?} at {t}"
                );
            }
        }
    }

    #[test]
    fn test_in_out_continuous_at_half() {
        for easing in Easing::ALL {
            let (_, mode) = easing.parts();
            if matches!(mode, EasingMode::InOut | EasingMode::OutIn) {
                let left = easing.apply(0.5 - 1e-7);
                let mid = easing.apply(0.5);
                assert!((mid - 0.5).abs() < EPS, "{easing:?}");
                assert!((left - mid).abs() < 1e-3, "{easing:?}");
            }
        }
    }

    #[test]
    fn test_known_values() {
        assert!((Easing::InQuad.apply(0.5) - 0.25).abs() < EPS);
        assert!((Easing::OutQuad.apply(0.5) - 0.75).abs() < EPS);
        assert!((Easing::InCubic.apply(0.5) - 0.125).abs() < EPS);
        assert!((Easing::InOutCubic.apply(0.25) - 0.0625).abs() < EPS);
        assert!((Easing::OutBounce.apply(0.5) - 0.765625).abs() < EPS);
    }

    #[test]
    fn test_back_overshoots() {
        assert!(Easing::InBack.apply(0.2) < 0.0);
        assert!(Easing::OutBack.apply(0.8) > 1.0);
    }

    #[test]
    fn test_serde_names() {
        let json = serde_json::to_string(&Easing::InOutSine).unwrap();
        assert_eq!(json, "\"InOutSine\"");
        let parsed: Easing = serde_json::from_str("\"OutInBounce\"").unwrap();
        assert_eq!(parsed, Easing::OutInBounce);
    }
}
