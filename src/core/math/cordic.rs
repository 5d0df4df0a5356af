// Copyright (c) 2026 Amunchain
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//     http://www.apache.org/licenses/LICENSE-2.0
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

#![forbid(unsafe_code)]

//! Fixed-point arctangent by CORDIC vectoring.
//!
//! Angles are returned in Q14 half-turns: `ATAN_SCALE` (0x4000) is pi. The
//! rotation runs on an internal scale where pi is 2^30 and is rounded to Q14 at
//! the end, which keeps the result within one Q14 unit of `atan2`.

/// Q14 value of pi.
pub const ATAN_SCALE: i32 = 0x4000;

const INTERNAL_TO_Q14: u32 = 16;
const INTERNAL_PI: i64 = 1 << 30;
const NORM_BITS: u32 = 62;

// round(atan(2^-i) / pi * 2^30)
const ANGLES: [i64; 30] = [
    268_435_456, 158_466_703, 83_729_454, 42_502_378, 21_333_666, 10_677_233, 5_339_919,
    2_670_123, 1_335_082, 667_543, 333_772, 166_886, 83_443, 41_722, 20_861, 10_430, 5_215,
    2_608, 1_304, 652, 326, 163, 81, 41, 20, 10, 5, 3, 1, 1,
];

/// `atan2(y, x)` in Q14 half-turns (`ATAN_SCALE` == pi).
pub fn atan2c(y: i128, x: i128) -> i32 {
    if y == 0 {
        return if x >= 0 { 0 } else { ATAN_SCALE };
    }
    if x == 0 {
        return if y > 0 { ATAN_SCALE / 2 } else { -ATAN_SCALE / 2 };
    }

    let (xa, ya) = normalize(x.unsigned_abs(), y.unsigned_abs());
    let mut xs = xa as i128;
    let mut ys = ya as i128;
    let mut z: i64 = 0;
    for (i, a) in ANGLES.iter().enumerate() {
        let dx = ys >> i;
        let dy = xs >> i;
        if ys >= 0 {
            xs += dx;
            ys -= dy;
            z += a;
        } else {
            xs -= dx;
            ys += dy;
            z -= a;
        }
    }

    let mut z = z.clamp(0, INTERNAL_PI / 2);
    if x < 0 {
        z = INTERNAL_PI - z;
    }
    if y < 0 {
        z = -z;
    }
    ((z + (1 << (INTERNAL_TO_Q14 - 1))) >> INTERNAL_TO_Q14) as i32
}

/// Scale both magnitudes so the larger one has exactly `NORM_BITS` bits.
fn normalize(x: u128, y: u128) -> (u128, u128) {
    let bits = 128 - x.max(y).leading_zeros();
    if bits > NORM_BITS {
        let s = bits - NORM_BITS;
        (x >> s, y >> s)
    } else {
        let s = NORM_BITS - bits;
        (x << s, y << s)
    }
}
