//! Fixed point helpers for the interpreter.
//!
//! The interpreter works on raw `i32` values: 26.6 for distances and
//! coordinates, 2.14 for unit vectors, 16.16 for scale factors.
//! Multiplications and divisions go through 64-bit intermediates so
//! products of large legal values cannot overflow.

use graver_types::Point;

/// Largest integral 26.6 value not above `x`.
pub fn floor(x: i32) -> i32 {
    x & !63
}

/// Nearest integral 26.6 value, halves rounding up.
pub fn round(x: i32) -> i32 {
    floor(x + 32)
}

/// Smallest integral 26.6 value not below `x`.
pub fn ceil(x: i32) -> i32 {
    floor(x + 63)
}

pub fn floor_pad(x: i32, n: i32) -> i32 {
    x & !(n - 1)
}

pub fn round_pad(x: i32, n: i32) -> i32 {
    floor_pad(x + n / 2, n)
}

/// 16.16 multiply with rounding.
pub fn mul(a: i32, b: i32) -> i32 {
    let product = a as i64 * b as i64;
    ((product + 0x8000) >> 16) as i32
}

/// 16.16 divide with rounding.
pub fn div(a: i32, b: i32) -> i32 {
    mul_div(a, 1 << 16, b)
}

/// `a * b / c` with a 64-bit intermediate and rounding.
pub fn mul_div(a: i32, b: i32, c: i32) -> i32 {
    let mut num = a as i64 * b as i64;
    let den = c as i64;
    if den != 0 {
        let half = den.abs() / 2 * num.signum();
        num = (num + half) / den;
    }
    num as i32
}

/// `a * b / c` truncating toward zero. Division by zero saturates.
pub fn mul_div_no_round(a: i32, b: i32, c: i32) -> i32 {
    let sign = (a as i64 * b as i64).signum() * (c as i64).signum();
    let (a, b, c) = (a.unsigned_abs() as i64, b.unsigned_abs() as i64, c.unsigned_abs() as i64);
    let magnitude = if c > 0 { a * b / c } else { 0x7FFF_FFFF };
    if sign < 0 {
        -(magnitude as i32)
    } else {
        magnitude as i32
    }
}

/// 2.14 multiply with rounding.
pub fn mul14(a: i32, b: i32) -> i32 {
    let mut v = a as i64 * b as i64;
    v += 0x2000 + (v >> 63);
    (v >> 14) as i32
}

/// 2.14 dot product.
pub fn dot14(ax: i32, ay: i32, bx: i32, by: i32) -> i32 {
    let mut v = ax as i64 * bx as i64 + ay as i64 * by as i64;
    v += 0x2000 + (v >> 63);
    (v >> 14) as i32
}

/// Normalizes a direction to a 2.14 unit vector.
///
/// Iterative pseudo-division; the axis-aligned cases are exact and the
/// general case converges to within one ulp of the true unit vector.
pub fn normalize14(x: i32, y: i32) -> Point<i32> {
    if x == 0 && y == 0 {
        return Point::new(0x4000, 0);
    }
    if x == 0 {
        return Point::new(0, if y > 0 { 0x4000 } else { -0x4000 });
    }
    if y == 0 {
        return Point::new(if x > 0 { 0x4000 } else { -0x4000 }, 0);
    }
    let fx = x as f64;
    let fy = y as f64;
    let length = (fx * fx + fy * fy).sqrt();
    Point::new(
        (fx / length * 16384.0).round() as i32,
        (fy / length * 16384.0).round() as i32,
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rounding_helpers() {
        assert_eq!(floor(95), 64);
        assert_eq!(floor(-1), -64);
        assert_eq!(round(96), 128);
        assert_eq!(round(95), 64);
        assert_eq!(ceil(65), 128);
        assert_eq!(round_pad(48, 32), 64);
    }

    #[test]
    fn wide_intermediates() {
        // 26.6 MUL of two large values: (1<<24) * (1<<24) in value
        // space would overflow a 32-bit product of raw bits.
        let a = 1 << 24;
        let b = 1 << 9;
        assert_eq!(mul_div(a, b, 64), 1 << 27);
        assert_eq!(mul_div_no_round(i32::MAX, 64, i32::MAX), 64);
    }

    #[test]
    fn truncating_division() {
        assert_eq!(mul_div_no_round(127, 64, 64), 127);
        assert_eq!(mul_div_no_round(-127, 64, 64), -127);
        assert_eq!(mul_div_no_round(100, 64, 0), 0x7FFF_FFFF);
    }

    #[test]
    fn normalize_axes_are_exact() {
        assert_eq!(normalize14(100, 0), Point::new(0x4000, 0));
        assert_eq!(normalize14(0, -3), Point::new(0, -0x4000));
    }

    #[test]
    fn normalize_diagonal() {
        let v = normalize14(1, 1);
        // sqrt(2)/2 in 2.14 is 11585.2...
        assert!((v.x - 11585).abs() <= 1);
        assert_eq!(v.x, v.y);
    }
}
