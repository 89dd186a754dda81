// Copyright 2025 eraflo
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

mod dds_decoder_lane;
mod generic_decoder_lane;
mod tga_decoder_lane;

pub use self::dds_decoder_lane::DdsDecoderLane;
pub use self::generic_decoder_lane::GenericDecoderLane;
pub use self::tga_decoder_lane::TgaDecoderLane;
